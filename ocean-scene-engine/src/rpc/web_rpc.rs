use bevy::diagnostic::DiagnosticsStore;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::engine::api::{SceneCommand, SceneNotification, SceneResponse};
use crate::engine::camera::ocean_camera::CameraMoveInput;
use crate::engine::core::app_setup::SceneSet;
use crate::engine::error::SceneError;
use crate::engine::interaction::proximity::ProximityProbe;
use crate::engine::scene_context::SceneContext;
use crate::engine::systems::fps_tracking::current_fps;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage bridge between the page and the scene.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(SceneSet::Lifecycle),
            )
            .add_systems(
                Update,
                (
                    forward_scene_notifications,
                    forward_scene_responses,
                    send_outgoing_messages,
                )
                    .chain()
                    .after(SceneSet::Interaction),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Synchronous queries answered straight from the world.
#[derive(SystemParam)]
struct SceneQueries<'w, 's> {
    probe: ProximityProbe<'w, 's>,
    context: Option<Res<'w, SceneContext>>,
    diagnostics: Option<Res<'w, DiagnosticsStore>>,
}

/// Outbound scene events produced by RPC methods.
#[derive(SystemParam)]
struct SceneInputs<'w> {
    commands: EventWriter<'w, SceneCommand>,
    camera_moves: EventWriter<'w, CameraMoveInput>,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    queries: SceneQueries,
    mut inputs: SceneInputs,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                rpc_interface.send_notification(
                    "debug_message",
                    json!({
                        "message": format!("Processing method: {}", request.method)
                    }),
                );

                if let Some(response) = handle_rpc_request(&request, &queries, &mut inputs) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                rpc_interface.send_notification(
                    "debug_message",
                    json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request. Scene commands answer later through
/// [`SceneResponse`]; everything else answers here.
fn handle_rpc_request(
    request: &RpcRequest,
    queries: &SceneQueries,
    inputs: &mut SceneInputs,
) -> Option<RpcResponse> {
    let id = request.id.clone();

    let result = match request.method.as_str() {
        "init" => parse_init(&request.params, id.clone()),
        "spawn_marker_object" => Ok(SceneCommand::SpawnMarker { request: id.clone() }),
        "hide_entities" => Ok(SceneCommand::HideEntities { request: id.clone() }),
        "fade_out_marker" => Ok(SceneCommand::FadeOutMarker { request: id.clone() }),
        "clean_up" => Ok(SceneCommand::CleanUp { request: id.clone() }),
        "dispose" => Ok(SceneCommand::Dispose { request: id.clone() }),
        method => {
            let result = handle_query(method, &request.params, queries, inputs)?;
            return id.map(|id| create_response(id, result));
        }
    };

    match result {
        Ok(command) => {
            inputs.commands.write(command);
            None
        }
        Err(error) => id.map(|id| create_response(id, Err(error))),
    }
}

/// Methods answered synchronously. `None` for unknown notifications.
fn handle_query(
    method: &str,
    params: &Value,
    queries: &SceneQueries,
    inputs: &mut SceneInputs,
) -> Option<Result<Value, RpcError>> {
    let result = match method {
        "check_proximity" => Ok(json!(queries.probe.is_near())),
        "get_entity_count" => Ok(json!(
            queries
                .context
                .as_ref()
                .map_or(0, |context| context.summary.entity_count)
        )),
        "get_marker_handle" => Ok(queries
            .probe
            .marker_handle()
            .map_or(Value::Null, |handle| handle.to_value())),
        "get_fps" => Ok(json!({
            "fps": queries.diagnostics.as_deref().and_then(current_fps).unwrap_or(0.0)
        })),
        "camera_move" => handle_camera_move(params, inputs),
        _ => {
            warn!("Unknown RPC method: {method}");
            Err(create_error(
                -32601,
                "Method not found",
                Some(json!({ "method": method })),
            ))
        }
    };
    Some(result)
}

fn handle_camera_move(params: &Value, inputs: &mut SceneInputs) -> Result<Value, RpcError> {
    let input = serde_json::from_value::<CameraMoveInput>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'direction' (forward|back|left|right) and 'active'")
    })?;
    inputs.camera_moves.write(input);
    Ok(json!({ "success": true }))
}

fn parse_init(params: &Value, request: Option<Value>) -> Result<SceneCommand, RpcError> {
    #[derive(Deserialize)]
    struct InitParams {
        surface: String,
        daily_bottle_count: Value,
    }

    let init = serde_json::from_value::<InitParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'surface' and 'daily_bottle_count' parameters")
    })?;
    let daily_bottle_count = parse_daily_bottle_count(&init.daily_bottle_count)?;

    Ok(SceneCommand::Init {
        request,
        surface: init.surface,
        daily_bottle_count,
    })
}

/// Accepts a positive integer, given as a number or a numeric string.
pub fn parse_daily_bottle_count(value: &Value) -> Result<u64, SceneError> {
    let invalid = || SceneError::InvalidInput(format!("not a positive whole number: {value}"));
    let count = match value {
        Value::Number(number) => match number.as_u64() {
            Some(count) => count,
            None => {
                let float = number.as_f64().ok_or_else(invalid)?;
                if float.fract() != 0.0 || float < 1.0 || float > u64::MAX as f64 {
                    return Err(invalid());
                }
                float as u64
            }
        },
        Value::String(text) => text.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    if count == 0 {
        return Err(invalid());
    }
    Ok(count)
}

fn forward_scene_responses(
    mut responses: EventReader<SceneResponse>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for response in responses.read() {
        let Some(id) = response.request.clone() else {
            if let Err(error) = &response.result {
                warn!("Scene command failed: {error}");
            }
            continue;
        };
        rpc_interface.queue_response(create_response(
            id,
            response.result.clone().map_err(RpcError::from),
        ));
    }
}

fn forward_scene_notifications(
    mut notifications: EventReader<SceneNotification>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for notification in notifications.read() {
        rpc_interface.send_notification(notification.method, notification.params.clone());
    }
}

fn create_response(id: Value, result: Result<Value, RpcError>) -> RpcResponse {
    match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    }
}

fn create_error(code: i32, message: &str, data: Option<Value>) -> RpcError {
    RpcError {
        code,
        message: message.to_string(),
        data,
    }
}

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No page on native builds.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

impl From<SceneError> for RpcError {
    fn from(error: SceneError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_count_accepts_positive_whole_numbers() {
        assert_eq!(parse_daily_bottle_count(&json!(3)), Ok(3));
        assert_eq!(parse_daily_bottle_count(&json!(2.0)), Ok(2));
        assert_eq!(parse_daily_bottle_count(&json!(" 12 ")), Ok(12));
    }

    #[test]
    fn daily_count_rejects_everything_else() {
        for value in [
            json!(0),
            json!(-4),
            json!(1.5),
            json!("abc"),
            json!(""),
            json!(null),
            json!([1]),
        ] {
            let result = parse_daily_bottle_count(&value);
            assert!(
                matches!(result, Err(SceneError::InvalidInput(_))),
                "{value} was accepted"
            );
        }
    }

    #[test]
    fn init_params_become_a_command() {
        let command = parse_init(
            &json!({ "surface": "#ocean-scene", "daily_bottle_count": 2 }),
            Some(json!(7)),
        )
        .unwrap();
        match command {
            SceneCommand::Init {
                request,
                surface,
                daily_bottle_count,
            } => {
                assert_eq!(request, Some(json!(7)));
                assert_eq!(surface, "#ocean-scene");
                assert_eq!(daily_bottle_count, 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn invalid_count_maps_to_invalid_params() {
        let error = parse_init(
            &json!({ "surface": "#ocean-scene", "daily_bottle_count": 0 }),
            None,
        )
        .unwrap_err();
        assert_eq!(error.code, -32602);
    }

    #[test]
    fn scene_errors_keep_their_codes() {
        let error = RpcError::from(SceneError::Cancelled);
        assert_eq!(error.code, -32005);
        assert_eq!(error.message, "operation cancelled by dispose");

        let response = create_response(json!(1), Err(SceneError::AlreadyActive.into()));
        assert_eq!(response.error.map(|error| error.code), Some(-32002));
        assert_eq!(response.result, None);
    }

    #[test]
    fn requests_without_params_parse() {
        let request: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"dispose","id":3}"#).unwrap();
        assert_eq!(request.params, Value::Null);
        assert_eq!(request.id, Some(json!(3)));
    }
}
