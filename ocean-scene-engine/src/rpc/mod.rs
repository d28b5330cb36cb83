//! JSON-RPC 2.0 bridge between the hosting page and the scene.
//!
//! The scene runs inside an iframe and talks to its parent through
//! `postMessage`.
//!
//! ```text
//! Page (parent window)  <──postMessage──>  Scene (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ SceneCommand
//!        │ <───────────────── Response (with ID) ─┤  (frames later)
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Methods
//!
//! Answered once the scene has finished the work:
//! - `init` `{ surface, daily_bottle_count }`: `{ entity_count, five_year_total }`
//! - `spawn_marker_object`: marker handle, or `null` when the model is missing
//! - `hide_entities`, `fade_out_marker`, `clean_up`, `dispose`: `null`
//!
//! Answered in the same frame:
//! - `check_proximity`: `bool`
//! - `get_entity_count`: number of bottle entities, `0` without a scene
//! - `get_marker_handle`: marker handle or `null`
//! - `get_fps`: `{ fps }`
//! - `camera_move` `{ direction, active }`: usually sent as a notification
//!
//! ## Notifications from the scene
//!
//! `loading_progress`, `scene_ready`, `proximity_reached`,
//! `cleanup_complete`, `viewport_resized`, `fps_update` and `debug_message`.
//!
//! ## Error codes
//!
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32001`: Drawing surface unavailable
//! - `-32002`: Scene already active
//! - `-32003`: No active scene
//! - `-32004`: Operation already in progress
//! - `-32005`: Cancelled by `dispose`

pub mod web_rpc;
