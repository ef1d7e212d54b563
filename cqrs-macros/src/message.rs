use crate::derive_utils::apply_derives;
use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Item, LitStr, Result, Token, parse::Parse, parse::ParseStream};

/// 消息种类，决定实现的 trait 路径与报错中的宏名
#[derive(Clone, Copy)]
pub(crate) enum MessageKind {
    Command,
    Query,
}

impl MessageKind {
    fn macro_name(self) -> &'static str {
        match self {
            Self::Command => "#[command]",
            Self::Query => "#[query]",
        }
    }

    fn trait_path(self) -> TokenStream {
        match self {
            Self::Command => quote!(::cqrs_application::command::Command),
            Self::Query => quote!(::cqrs_application::query::Query),
        }
    }
}

/// #[command] / #[query] 宏实现
/// - 支持结构体与枚举（含泛型）
/// - 合并/追加派生：Debug（可通过 `debug = false` 关闭）
/// - 实现对应 trait，`NAME` 默认取类型名，可通过 `name = "..."` 覆写
pub(crate) fn expand(kind: MessageKind, cfg: MessageAttrConfig, mut input: Item) -> Result<TokenStream> {
    let required: Vec<syn::Path> = if cfg.derive_debug.unwrap_or(true) {
        vec![syn::parse_quote!(Debug)]
    } else {
        Vec::new()
    };

    let (ident, generics) = match &mut input {
        Item::Struct(st) => {
            apply_derives(&mut st.attrs, required);
            (st.ident.clone(), st.generics.clone())
        }
        Item::Enum(en) => {
            apply_derives(&mut en.attrs, required);
            (en.ident.clone(), en.generics.clone())
        }
        other => {
            return Err(syn::Error::new(
                other.span(),
                format!("{} only supports struct or enum", kind.macro_name()),
            ));
        }
    };

    let name = cfg
        .name
        .map(|lit| lit.value())
        .unwrap_or_else(|| ident.to_string());
    let trait_path = kind.trait_path();
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics #trait_path for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}

// -------- parsing --------

pub(crate) struct MessageAttrConfig {
    name: Option<LitStr>,
    derive_debug: Option<bool>,
}

impl Parse for MessageAttrConfig {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut cfg = Self {
            name: None,
            derive_debug: None,
        };
        if input.is_empty() {
            return Ok(cfg);
        }

        let pairs: Punctuated<MessageAttrElem, Token![,]> = Punctuated::parse_terminated(input)?;

        for elem in pairs {
            match elem {
                MessageAttrElem::Name(lit) => {
                    if cfg.name.is_some() {
                        return Err(syn::Error::new(lit.span(), "duplicate key 'name' in attribute"));
                    }
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "'name' must not be empty"));
                    }
                    cfg.name = Some(lit);
                }
                MessageAttrElem::Debug(span, b) => {
                    if cfg.derive_debug.is_some() {
                        return Err(syn::Error::new(span, "duplicate key 'debug' in attribute"));
                    }
                    cfg.derive_debug = Some(b);
                }
            }
        }
        Ok(cfg)
    }
}

enum MessageAttrElem {
    Name(LitStr),
    Debug(proc_macro2::Span, bool),
}

impl Parse for MessageAttrElem {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: syn::Ident = input.parse()?;
        let _eq: Token![=] = input.parse()?;
        let expr: syn::Expr = input.parse()?;

        if key == "name" {
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) => Ok(Self::Name(s)),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected string literal for 'name'",
                )),
            }
        } else if key == "debug" {
            match expr {
                syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Bool(b),
                    ..
                }) => Ok(Self::Debug(key.span(), b.value())),
                other => Err(syn::Error::new(
                    other.span(),
                    "expected boolean literal for 'debug'",
                )),
            }
        } else {
            Err(syn::Error::new(
                key.span(),
                "unknown key in attribute; expected 'name' or 'debug'",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(kind: MessageKind, attr: TokenStream, item: TokenStream) -> String {
        let cfg: MessageAttrConfig = syn::parse2(attr).unwrap();
        let input: Item = syn::parse2(item).unwrap();
        expand(kind, cfg, input).unwrap().to_string()
    }

    #[test]
    fn default_name_is_type_ident() {
        let out = expand_str(MessageKind::Command, quote!(), quote!(struct CreateUser { name: String }));
        assert!(out.contains("derive (Debug)"));
        assert!(out.contains(":: cqrs_application :: command :: Command for CreateUser"));
        assert!(out.contains("\"CreateUser\""));
    }

    #[test]
    fn explicit_name_and_no_debug() {
        let out = expand_str(
            MessageKind::Query,
            quote!(name = "user.get", debug = false),
            quote!(struct GetUser;),
        );
        assert!(!out.contains("Debug"));
        assert!(out.contains(":: cqrs_application :: query :: Query for GetUser"));
        assert!(out.contains("\"user.get\""));
    }

    #[test]
    fn rejects_unknown_and_duplicate_keys() {
        assert!(syn::parse2::<MessageAttrConfig>(quote!(title = "x")).is_err());
        assert!(syn::parse2::<MessageAttrConfig>(quote!(name = "a", name = "b")).is_err());
        assert!(syn::parse2::<MessageAttrConfig>(quote!(name = 1)).is_err());
    }

    #[test]
    fn rejects_non_type_items() {
        let cfg: MessageAttrConfig = syn::parse2(quote!()).unwrap();
        let input: Item = syn::parse2(quote!(fn nope() {})).unwrap();
        assert!(expand(MessageKind::Command, cfg, input).is_err());
    }
}
