//! Procedural macros for Wasil.
//!
//! Use them through the `wasil` crate:
//!
//! ```rust,ignore
//! use wasil::Injectable;
//!
//! #[derive(Default, Injectable)]
//! #[inject(provides(Notifier))]
//! struct MailNotifier {
//!     #[inject(named = "smtp")]
//!     transport: Option<Arc<dyn Transport>>,
//!     templates: Option<Arc<Templates>>,
//! }
//! ```

use std::env::var_os;

use proc_macro::TokenStream;
use quote::ToTokens;
use syn::{DeriveInput, parse_macro_input};

mod injectable;

/// Implements `Injectable` and `Reflect` for a struct with named fields
/// or a unit struct.
///
/// Every field of type `Option<Arc<X>>` is a dependency, resolved from the
/// default namespace unless configured otherwise.
///
/// Struct attributes:
/// - `#[inject(provides(TraitA, TraitB))]`: capabilities the struct can be
///   registered and resolved as
///
/// Field attributes:
/// - `#[inject(named = "replica")]`: resolve from a namespace
/// - `#[inject(tag = "named:replica")]`: the same, as a tag string
/// - `#[inject(skip)]`: never inject this field
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(injectable::expand(&input))
}

fn expand<T>(result: darling::Result<T>) -> TokenStream
where
    T: ToTokens,
{
    match result {
        Ok(tokens) => {
            let tokens: TokenStream = tokens.into_token_stream().into();
            if var_os("WASIL_MACROS_DEBUG").is_some() {
                eprintln!("{tokens}");
            }
            tokens
        }
        Err(err) => err.write_errors().into(),
    }
}
