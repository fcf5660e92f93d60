//! # elif-odm-derive
//!
//! Derive macro for elif-odm documents.
//!
//! - `#[derive(Document)]`: implement `elif_odm::Model` and generate typed
//!   association accessors from `#[document(...)]` attributes

use proc_macro::TokenStream;

mod document;

/// Derive `Model` plus association accessors for a document struct
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::document_impl(input)
}
