//! The library code for the `folio` portfolio site. The architecture can be
//! generally broken down into two distinct steps:
//!
//! 1. Loading the site at startup ([`crate::site::Site::load`])
//! 2. Producing pages from it, either per request ([`crate::serve`]) or all at
//!    once into static files ([`crate::build`])
//!
//! Of the two, the first step holds the interesting rules. The buzzword
//! vocabulary ([`crate::buzzword`]) is loaded and normalized first, then the
//! project catalog ([`crate::project`]) is loaded against it, resolving each
//! project's description and registering any buzzword a project uses without
//! defining it. After that nothing is mutated: the loaded [`crate::site::Site`]
//! is shared read-only by every request.
//!
//! Producing a page is a pure mapping. A tag query is resolved against the
//! vocabulary and used to filter the catalog ([`crate::tag`]), the result is
//! assembled into a page context ([`crate::context`]), and the context is
//! handed to the templates ([`crate::render`]). Error pages exist only for the
//! statuses listed in [`crate::status`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod buzzword;
pub mod config;
pub mod context;
pub mod error;
pub mod project;
pub mod render;
pub mod serve;
pub mod site;
pub mod status;
pub mod tag;
pub mod value;
pub mod write;
