//! CQRS 契约宏（cqrs-macros）
//!
//! - `#[command]`：为结构体/枚举实现 `cqrs_application::command::Command`
//! - `#[query]`：为结构体/枚举实现 `cqrs_application::query::Query`
//!
//! 两者均支持参数 `name = "..."`（稳定名称，默认类型名）与 `debug = bool`（默认追加 `Debug` 派生）。
//!
use proc_macro::TokenStream;
use syn::{Item, parse_macro_input};

mod derive_utils;
mod message;

use message::{MessageAttrConfig, MessageKind};

/// 命令宏
///
/// ```ignore
/// #[command(name = "user.create")]
/// struct CreateUser { name: String }
/// ```
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    message::expand(MessageKind::Command, cfg, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 查询宏
#[proc_macro_attribute]
pub fn query(attr: TokenStream, item: TokenStream) -> TokenStream {
    let cfg = parse_macro_input!(attr as MessageAttrConfig);
    let input = parse_macro_input!(item as Item);

    message::expand(MessageKind::Query, cfg, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
