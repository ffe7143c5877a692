//! # kilo-editor — Editor core for kilo
//!
//! Everything between a decoded key and a frame of VT100 bytes:
//!
//! - **[`row`]** — `Row` (raw bytes plus tab-expanded render) and `RowStore`
//! - **[`view`]** — `Cursor` movement and the scrolling `Viewport`
//! - **[`editor`]** — `Editor` state, key dispatch, file loading
//! - **[`render`]** — frame drawing: text area, status bar, message bar
//! - **[`config`]** — tab stop, message timeout, startup message
//! - **[`error`]** — `EditorError`
//!
//! Terminal access lives in `kilo-term`; this crate only writes into an
//! `OutputBuffer` and reads `Key` values, so all of it runs in tests
//! without a terminal.

pub mod config;
pub mod editor;
pub mod error;
pub mod render;
pub mod row;
pub mod view;
