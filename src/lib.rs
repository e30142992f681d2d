/*!
# Hatim

A browser-based sign-up sheet for shared Quran recitations, built in Rust.

## Overview

Participants pick a cüz (one of the thirty parts) of a hatim (a complete
recitation) and write their name next to it. Five hatims are run one after
another: a hatim can only be opened once every cüz of the hatims before it
has a name. An admin can change names that are already filled in and
download the whole sheet as an Excel file.

The records themselves live in a remote REST resource; this application keeps
one in-memory copy per browser session and renders it as plain HTML forms.

## Architecture

### Remote resource
- `GET /cuzlers` - every record of every hatim
- `PATCH /cuzlers/{id}` - set `personName` on one record

### Web layer
- **Technologies**: Rust, axum, handlebars
- Session cookie per browser, each session owning one view
- Local state only changes after the remote PATCH succeeded
- "Güncellendi" feedback that clears itself after a short window

## Modules

- **cuz**: The record type and its wire format
- **view**: Cycle assignment view (hatim gating, input buffers, edit mode, admin flag)
- **flash**: Cancellable per-cüz tasks that close the "updated" window
- **api**: Client for the remote `cuzlers` resource
- **login**: Admin gate and session cookies
- **downloader**: Export functionality (XLSX, CSV)
- **config**: Configuration from environment variables
- **app**: Routing and handlers

## HTTP Endpoints

- `/` - The sign-up page
- `/hatim/{n}` - Switch to hatim n
- `/cuz/{id}` - Submit a name
- `/cuz/{id}/edit` - Reopen a filled name for editing (admin)
- `/admin/login`, `/admin/visibility` - Admin password form
- `/export/cuzlers.xlsx`, `/export/cuzlers.csv` - Downloads (admin)
- `/api/view` - The current view as JSON
*/

pub mod config;
pub mod cuz;
pub mod downloader;
pub mod error;
pub mod view;

#[cfg(feature = "web")]
pub mod api;
#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod flash;
#[cfg(feature = "web")]
pub mod login;

pub use cuz::*;
pub use downloader::*;
pub use error::*;
pub use view::*;
