use cqrs_application::query::Query;
use cqrs_macros::query;
use std::marker::PhantomData;

#[query(name = "page")]
struct Page<T: Send + Sync + 'static> {
    offset: usize,
    limit: usize,
    _marker: PhantomData<T>,
}

#[query(debug = false)]
enum Lookup {
    ById(u32),
    ByName(String),
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::ById(id) => write!(f, "#{id}"),
            Lookup::ByName(name) => f.write_str(name),
        }
    }
}

fn main() {
    assert_eq!(<Page<String> as Query>::NAME, "page");
    assert_eq!(Lookup::NAME, "Lookup");

    let p: Page<u8> = Page {
        offset: 0,
        limit: 10,
        _marker: PhantomData,
    };
    assert_eq!(p.offset + p.limit, 10);
    assert_eq!(format!("{:?}", Lookup::ById(7)), "#7");
    assert_eq!(format!("{:?}", Lookup::ByName("x".into())), "x");
}
