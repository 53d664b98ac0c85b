//! ticketing-store - A schema-validated entity store for transport ticketing
//!
//! Collections of JSON documents checked against registered schemas, with
//! unique and compound indexes, soft references between documents, and
//! status lifecycles for tickets, trips, payments and disruptions.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod document;
pub mod index;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod reference;
pub mod schema;
pub mod store;
