//! Lexer, parser, and element tree for **shader-art host markup**.
//!
//! A `<shader-art>` host carries its shaders and uniform declarations as
//! child tags. This crate turns that markup into an [`ast::Element`] tree with
//! the two capabilities the rest of the workspace relies on: enumerating child
//! elements by tag and looking up attributes by name.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `Document`, `Node`, `Element`, `Attribute` |
//! | [`error`] | `ParseError`, `ParseErrorKind` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use shader_art_markup::parse_str;
//!
//! let src = r#"
//!     <shader-art autoplay>
//!         <uniform type="float" name="speed" value="0.5" />
//!     </shader-art>
//! "#;
//!
//! let doc = parse_str(src).unwrap();
//! let host = doc.first("shader-art").unwrap();
//! let speed = host.children_tagged("uniform").next().unwrap();
//! assert_eq!(speed.attr("value"), Some("0.5"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Document, Element, Node};
pub use error::{ParseError, ParseErrorKind};
pub use parser::parse_str;
