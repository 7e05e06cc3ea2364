//! geoacquire - feature-server layer acquisition.
//!
//! Scans an ArcGIS REST catalog for services matching a keyword list and
//! saves each of their layers as a GeoJSON file, paging by object ID.

pub mod cli;
pub mod config;
pub mod feature_server;
pub mod http_client;
pub mod services;
pub mod storage;
