//! In-memory tree model of an SKD document
//!
//! A [`Database`] owns one [`Structure`] plus its doctype and version
//! declarations. The structure owns the top-level [`Tag`]s, which in turn own
//! their children and [`Property`] lists. Refined nodes keep the same types and
//! report their shape through [`NodeVariant`].

mod database;
mod declaration;
mod main_tags;
mod property;
mod tag;
mod variant;

pub use database::Database;
pub use declaration::{DoctypeDeclaration, VersionDeclaration, CURRENT_VERSION};
pub use main_tags::Structure;
pub use property::Property;
pub use tag::Tag;
pub use variant::NodeVariant;
