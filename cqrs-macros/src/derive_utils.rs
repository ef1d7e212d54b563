use quote::ToTokens;
use syn::{Attribute, Token};

// 提取非 derive 属性与已有 derive 列表
pub(crate) fn split_derives(attrs: &[Attribute]) -> (Vec<Attribute>, Vec<syn::Path>) {
    let mut retained = Vec::new();
    let mut existing = Vec::new();
    for attr in attrs.iter() {
        if attr.path().is_ident("derive") {
            if let Ok(list) = attr.parse_args_with(
                syn::punctuated::Punctuated::<syn::Path, Token![,]>::parse_terminated,
            ) {
                existing.extend(list);
            }
        } else {
            retained.push(attr.clone());
        }
    }
    (retained, existing)
}

// 归一化 derive 的 key，避免 Debug/std::fmt::Debug 重复
pub(crate) fn derive_key(p: &syn::Path) -> String {
    match p.segments.last() {
        Some(last) => last.ident.to_string(),
        None => p.to_token_stream().to_string(),
    }
}

// 合并 required 与已有 derive（去重，优先保留 required），全部为空时不生成 derive
pub(crate) fn apply_derives(attrs: &mut Vec<Attribute>, required: Vec<syn::Path>) {
    let (retained, existing) = split_derives(attrs);

    let mut seen = std::collections::HashSet::<String>::new();
    let merged: Vec<syn::Path> = required
        .into_iter()
        .chain(existing)
        .filter(|p| seen.insert(derive_key(p)))
        .collect();

    *attrs = if merged.is_empty() {
        retained
    } else {
        let derive: Attribute = syn::parse_quote!(#[derive(#(#merged),*)]);
        std::iter::once(derive).chain(retained).collect()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_without_duplicates() {
        let mut attrs: Vec<Attribute> = vec![
            syn::parse_quote!(#[derive(Clone, std::fmt::Debug)]),
            syn::parse_quote!(#[doc = "x"]),
        ];
        apply_derives(&mut attrs, vec![syn::parse_quote!(Debug)]);

        assert_eq!(attrs.len(), 2);
        let (_, derives) = split_derives(&attrs);
        let keys: Vec<_> = derives.iter().map(derive_key).collect();
        assert_eq!(keys, ["Debug", "Clone"]);
    }

    #[test]
    fn no_derive_emitted_when_nothing_required() {
        let mut attrs: Vec<Attribute> = vec![syn::parse_quote!(#[doc = "x"])];
        apply_derives(&mut attrs, Vec::new());
        assert_eq!(attrs.len(), 1);
        assert!(!attrs[0].path().is_ident("derive"));
    }
}
