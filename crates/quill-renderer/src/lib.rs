//! Kind-dispatched renderer for Quill syntax trees.
//!
//! This crate turns a [`quill_syntax::SyntaxTree`] into output text by
//! dispatching every node to an [`ObjectWriter`] chosen by the node's kind.
//!
//! # Architecture
//!
//! - [`ObjectRendererRegistry`]: ordered writers for one [`OutputFormat`];
//!   the first writer whose [`Family`] accepts a kind renders it
//! - [`TryWriterChain`]: named interceptors each writer consults before its
//!   own body, so extensions can override single cases
//! - [`Renderer`]: per-render traversal state (depth guard, position flags,
//!   escaping, observers) writing into any `fmt::Write` sink
//! - a dispatch cache inside the registry memoizes kind resolution and is
//!   shared safely between renderers on different threads
//!
//! Built-in writer sets live in [`html`] and [`text`].
//!
//! # Example
//!
//! ```
//! use quill_config::RendererOptions;
//! use quill_renderer::html;
//! use quill_syntax::{TreeBuilder, kinds};
//!
//! let mut builder = TreeBuilder::new();
//! let doc = builder.add_root(&kinds::DOCUMENT).unwrap();
//! let heading = builder.add_child(doc, &kinds::HEADING).unwrap();
//! builder.set_level(heading, 1).unwrap();
//! builder.add_text(heading, &kinds::TEXT, "Hello").unwrap();
//!
//! let html = html::to_html(&builder.build(), &RendererOptions::default()).unwrap();
//! assert_eq!(html, "<h1>Hello</h1>\n");
//! ```

mod cache;
mod error;
mod escape;
mod family;
mod format;
pub mod html;
mod registry;
mod renderer;
pub mod text;
mod url_escape;
mod writer;

pub use cache::DispatchStats;
pub use error::RenderError;
pub use escape::{EscapeMode, escape_text, escape_text_lossy, escape_to_string};
pub use family::Family;
pub use format::{Html, OutputFormat, PlainText};
pub use registry::ObjectRendererRegistry;
pub use renderer::{DispatchMode, Renderer, RendererBuilder, WriteObserver, render_to_string};
pub use url_escape::{LinkRewriter, UrlEscaper, escape_url};
pub use writer::{FnWriter, ObjectWriter, TryWriteFn, TryWriterChain, WriteFn};
