use cqrs_application::command::Command;
use cqrs_macros::command;

#[command]
struct CreateUser {
    name: String,
}

#[command(name = "user.rename")]
#[derive(Clone)]
struct RenameUser {
    id: u32,
    name: String,
}

fn main() {
    assert_eq!(CreateUser::NAME, "CreateUser");
    assert_eq!(RenameUser::NAME, "user.rename");

    let cmd = RenameUser {
        id: 1,
        name: "bob".into(),
    };
    let copy = cmd.clone();
    let _ = format!("{:?} {:?}", copy, CreateUser { name: "alice".into() });
    assert_eq!(copy.id, 1);
    assert_eq!(cmd.name, "bob");
}
