//! `#[breeze_entity]` prepends the columns every Breeze table shares
//! (`id`, `created_at`, `updated_at`) to a sea-orm model and wires the
//! DAO traits that `DaoBase::create` and `DaoBase::update` rely on.

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    Expr, ExprLit, Field, Fields, FieldsNamed, Ident, ItemStruct, Lit, LitStr, Meta, Path,
    Token, parse_macro_input, parse_quote, punctuated::Punctuated,
};

const DEFAULT_TRAITS_PATH: &str = "crate::db::dao::base_traits";

struct EntityOptions {
    traits: Path,
    active_model: Ident,
}

impl EntityOptions {
    fn parse(args: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut traits: Path = syn::parse_str(DEFAULT_TRAITS_PATH)?;
        let mut active_model = Ident::new("ActiveModel", Span::call_site());

        for meta in args {
            let Meta::NameValue(pair) = meta else {
                return Err(syn::Error::new_spanned(
                    meta,
                    "expected `key = \"value\"` arguments",
                ));
            };
            let key = pair
                .path
                .get_ident()
                .map(Ident::to_string)
                .unwrap_or_default();
            let value = string_literal(&pair.value)?;

            match key.as_str() {
                "traits" => traits = value.parse()?,
                "active_model" => active_model = Ident::new(&value.value(), value.span()),
                _ => {
                    return Err(syn::Error::new_spanned(
                        pair.path,
                        "unknown breeze_entity argument; expected `traits` or `active_model`",
                    ));
                }
            }
        }

        Ok(Self {
            traits,
            active_model,
        })
    }
}

fn string_literal(expr: &Expr) -> syn::Result<LitStr> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) => Ok(lit.clone()),
        other => Err(syn::Error::new_spanned(other, "expected a string literal")),
    }
}

fn shared_columns() -> [Field; 3] {
    [
        parse_quote! {
            #[sea_orm(primary_key, auto_increment = false)]
            pub id: uuid::Uuid
        },
        parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub created_at: sea_orm::entity::prelude::DateTimeWithTimeZone
        },
        parse_quote! {
            #[sea_orm(default_expr = "Expr::current_timestamp()")]
            pub updated_at: sea_orm::entity::prelude::DateTimeWithTimeZone
        },
    ]
}

fn prepend_shared_columns(fields: &mut FieldsNamed) -> syn::Result<()> {
    for field in &fields.named {
        if let Some(ident) = &field.ident {
            if matches!(ident.to_string().as_str(), "id" | "created_at" | "updated_at") {
                return Err(syn::Error::new_spanned(
                    ident,
                    "breeze_entity already provides this column",
                ));
            }
        }
    }

    let declared = std::mem::take(&mut fields.named);
    fields.named.extend(shared_columns());
    fields.named.extend(declared);
    Ok(())
}

fn trait_impls(options: &EntityOptions) -> TokenStream2 {
    let EntityOptions {
        traits,
        active_model,
    } = options;

    quote! {
        impl #traits::HasIdActiveModel for #active_model {
            fn set_id(&mut self, id: uuid::Uuid) {
                self.id = sea_orm::ActiveValue::Set(id);
            }
        }

        impl #traits::TimestampedActiveModel for #active_model {
            fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.created_at = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.updated_at = sea_orm::ActiveValue::Set(ts);
            }
        }

        impl #traits::HasCreatedAtColumn for Entity {
            fn created_at_column() -> Column {
                Column::CreatedAt
            }
        }
    }
}

#[proc_macro_attribute]
pub fn breeze_entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr with Punctuated<Meta, Token![,]>::parse_terminated);
    let mut model = parse_macro_input!(item as ItemStruct);

    let options = match EntityOptions::parse(args) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error().into(),
    };

    let Fields::Named(fields) = &mut model.fields else {
        return syn::Error::new_spanned(&model, "breeze_entity expects named fields")
            .to_compile_error()
            .into();
    };
    if let Err(err) = prepend_shared_columns(fields) {
        return err.to_compile_error().into();
    }

    let impls = trait_impls(&options);
    quote! {
        #model
        #impls
    }
    .into()
}
