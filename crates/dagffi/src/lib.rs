//! C ABI over the dataflow engine
//!
//! Every function returns a small integer status (0 on success) or a
//! pointer, never unwinds, and records a readable message for the calling
//! thread that `engine_last_error` returns. Graph handles are created with
//! `engine_graph_create` and must be released with `engine_graph_destroy`.
//! A handle is not thread-safe; callers serialize access to it.

mod buffers;

use dagcore::{GraphError, OutputError, Value, ValueType};
use dagruntime::{Graph, GraphRuntime};
use std::borrow::Cow;
use std::ffi::{c_char, c_int, CStr};
use std::ptr;

/// Output value kind, as reported by `engine_graph_get_output_type`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngType {
    Number = 0,
    String = 1,
    Bool = 2,
}

impl From<ValueType> for EngType {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Number => EngType::Number,
            ValueType::String => EngType::String,
            ValueType::Bool => EngType::Bool,
        }
    }
}

/// Opaque graph handle: the graph, the runtime that executes it and the
/// single-threaded async runtime driving the executor
pub struct EngineGraph {
    graph: Graph,
    runtime: GraphRuntime,
    executor: tokio::runtime::Runtime,
}

impl EngineGraph {
    fn new() -> std::io::Result<Self> {
        let runtime = GraphRuntime::new(dagnodes::standard_registry());
        let executor = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            graph: runtime.create_graph(),
            runtime,
            executor,
        })
    }
}

/// Status codes shared by the mutation calls. `1` is always a null argument.
fn graph_status(error: &GraphError) -> c_int {
    match error {
        GraphError::DuplicateNode(_) | GraphError::NodeNotFound(_) => 2,
        GraphError::UnknownNodeType(_) | GraphError::SourceIndexOutOfRange { .. } => 3,
        GraphError::TargetIndexOutOfRange { .. } => 4,
        GraphError::TypeMismatch { .. } => 5,
        GraphError::CyclicDependency => 2,
    }
}

fn output_status(error: &OutputError) -> c_int {
    match error {
        OutputError::PinOutOfRange(_) => 2,
        OutputError::NodeMissing(_) => 3,
        OutputError::NoValue { .. } => 4,
        OutputError::WrongType { .. } => 5,
    }
}

fn report(operation: &str, error: &GraphError) -> c_int {
    buffers::set_last_error(format!("{}: {}", operation, error));
    graph_status(error)
}

/// Negative indices can never be in range
fn index(raw: c_int) -> usize {
    usize::try_from(raw).unwrap_or(usize::MAX)
}

unsafe fn text<'a>(raw: *const c_char) -> Option<Cow<'a, str>> {
    if raw.is_null() {
        None
    } else {
        Some(CStr::from_ptr(raw).to_string_lossy())
    }
}

unsafe fn set_param(
    operation: &str,
    g: *mut EngineGraph,
    node_id: c_int,
    key: *const c_char,
    value: Option<Value>,
) -> c_int {
    let (Some(handle), Some(key), Some(value)) = (g.as_mut(), text(key), value) else {
        buffers::set_last_error(format!("{}: null args", operation));
        return 1;
    };
    match handle.graph.set_param(node_id, key.into_owned(), value) {
        Ok(()) => 0,
        Err(e) => report(operation, &e),
    }
}

/// Create an empty graph bound to the standard node library. Returns null if
/// the handle cannot be set up.
#[no_mangle]
pub extern "C" fn engine_graph_create() -> *mut EngineGraph {
    match EngineGraph::new() {
        Ok(handle) => Box::into_raw(Box::new(handle)),
        Err(e) => {
            buffers::set_last_error(format!("engine_graph_create: {}", e));
            ptr::null_mut()
        }
    }
}

/// # Safety
/// `g` must be null or a handle from `engine_graph_create` not yet destroyed.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_destroy(g: *mut EngineGraph) {
    if !g.is_null() {
        drop(Box::from_raw(g));
    }
}

/// Returns 0, 1 on null graph or type, 2 on duplicate id, 3 on unknown type.
/// A null `name` is treated as empty.
///
/// # Safety
/// `g` must be null or a live handle; `type_name` and `name` must be null or
/// NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_add_node_with_id(
    g: *mut EngineGraph,
    node_id: c_int,
    type_name: *const c_char,
    name: *const c_char,
) -> c_int {
    let (Some(handle), Some(type_name)) = (g.as_mut(), text(type_name)) else {
        buffers::set_last_error("add_node: null args");
        return 1;
    };
    let name = text(name).unwrap_or_default().into_owned();
    match handle.graph.add_node(node_id, &type_name, name) {
        Ok(()) => 0,
        Err(e) => report("add_node", &e),
    }
}

/// Returns 0, 1 on null args, 2 on unknown node.
///
/// # Safety
/// `g` must be null or a live handle; `key` must be null or a NUL-terminated
/// string.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_set_param_number(
    g: *mut EngineGraph,
    node_id: c_int,
    key: *const c_char,
    value: f64,
) -> c_int {
    set_param("set_param_number", g, node_id, key, Some(Value::Number(value)))
}

/// Returns 0, 1 on null args (including a null value), 2 on unknown node.
///
/// # Safety
/// `g` must be null or a live handle; `key` and `value` must be null or
/// NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_set_param_string(
    g: *mut EngineGraph,
    node_id: c_int,
    key: *const c_char,
    value: *const c_char,
) -> c_int {
    let value = text(value).map(|v| Value::String(v.into_owned()));
    set_param("set_param_string", g, node_id, key, value)
}

/// Any non-zero `value` is true.
///
/// # Safety
/// Same as `engine_graph_set_param_number`.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_set_param_bool(
    g: *mut EngineGraph,
    node_id: c_int,
    key: *const c_char,
    value: c_int,
) -> c_int {
    set_param("set_param_bool", g, node_id, key, Some(Value::Bool(value != 0)))
}

/// Returns 0, 1 on null graph, 2 on unknown node, 3 when the output index is
/// out of range, 4 when the input index is out of range, 5 on socket type
/// mismatch.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_connect(
    g: *mut EngineGraph,
    from_node: c_int,
    from_output_idx: c_int,
    to_node: c_int,
    to_input_idx: c_int,
) -> c_int {
    let Some(handle) = g.as_mut() else {
        buffers::set_last_error("connect: null graph");
        return 1;
    };
    match handle
        .graph
        .connect(from_node, index(from_output_idx), to_node, index(to_input_idx))
    {
        Ok(()) => 0,
        Err(e) => report("connect", &e),
    }
}

/// Returns 0, 1 on null graph, 2 on unknown node, 3 when the index is out of
/// range.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_add_output(
    g: *mut EngineGraph,
    node_id: c_int,
    out_index: c_int,
) -> c_int {
    let Some(handle) = g.as_mut() else {
        buffers::set_last_error("add_output: null graph");
        return 1;
    };
    match handle.graph.add_output(node_id, index(out_index)) {
        Ok(()) => 0,
        Err(e) => report("add_output", &e),
    }
}

/// Run the graph to completion on the calling thread. Returns 0, 1 on null
/// graph, 2 when validation or execution failed.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_run(g: *mut EngineGraph) -> c_int {
    let Some(EngineGraph {
        graph,
        runtime,
        executor,
    }) = g.as_mut()
    else {
        buffers::set_last_error("run: null graph");
        return 1;
    };
    match executor.block_on(runtime.run(graph)) {
        Ok(_) => 0,
        Err(e) => {
            let message = graph.last_error().map(str::to_string);
            buffers::set_last_error(message.unwrap_or_else(|| e.to_string()));
            2
        }
    }
}

/// Number of designated output pins; 0 for a null graph.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_get_output_count(g: *mut EngineGraph) -> c_int {
    g.as_ref()
        .map(|handle| c_int::try_from(handle.graph.output_count()).unwrap_or(c_int::MAX))
        .unwrap_or(0)
}

/// Kind of the value held by pin `index`. Falls back to `Number` when there is
/// nothing to report.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_get_output_type(g: *mut EngineGraph, index: c_int) -> EngType {
    g.as_ref()
        .and_then(|handle| handle.graph.output_type(self::index(index)).ok())
        .map(EngType::from)
        .unwrap_or(EngType::Number)
}

/// Returns 0, 1 on null arguments, 2 when the pin is out of range, 3 when its
/// node is missing, 4 when the node produced no value there, 5 when the value
/// is not a number.
///
/// # Safety
/// `g` must be null or a live handle; `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_get_output_number(
    g: *mut EngineGraph,
    index: c_int,
    out: *mut f64,
) -> c_int {
    let (Some(handle), Some(out)) = (g.as_ref(), out.as_mut()) else {
        return 1;
    };
    match handle.graph.output_number(self::index(index)) {
        Ok(value) => {
            *out = value;
            0
        }
        Err(e) => output_status(&e),
    }
}

/// Same statuses as `engine_graph_get_output_number`; writes 1 or 0.
///
/// # Safety
/// `g` must be null or a live handle; `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_get_output_bool(
    g: *mut EngineGraph,
    index: c_int,
    out: *mut c_int,
) -> c_int {
    let (Some(handle), Some(out)) = (g.as_ref(), out.as_mut()) else {
        return 1;
    };
    match handle.graph.output_bool(self::index(index)) {
        Ok(value) => {
            *out = c_int::from(value);
            0
        }
        Err(e) => output_status(&e),
    }
}

/// String held by pin `index`, or null on any mismatch. The pointer is valid
/// until the next call of this function on the same thread.
///
/// # Safety
/// `g` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn engine_graph_get_output_string(
    g: *mut EngineGraph,
    index: c_int,
) -> *const c_char {
    match g
        .as_ref()
        .and_then(|handle| handle.graph.output_string(self::index(index)).ok())
    {
        Some(value) => buffers::output_string(value),
        None => ptr::null(),
    }
}

/// Message of the most recent failure on this thread; empty if none. Never
/// null.
#[no_mangle]
pub extern "C" fn engine_last_error() -> *const c_char {
    buffers::last_error()
}

/// JSON array of every registered node type name, sorted. Valid until the
/// next call on the same thread.
#[no_mangle]
pub extern "C" fn engine_list_types() -> *const c_char {
    match dagnodes::standard_registry().list_types_json() {
        Ok(json) => buffers::type_list(&json),
        Err(e) => {
            buffers::set_last_error(format!("engine_list_types: {}", e));
            ptr::null()
        }
    }
}

/// JSON description of one node type (name, version, description, inputs,
/// outputs, params), or null if the name is null or unknown. Valid until the
/// next call on the same thread.
///
/// # Safety
/// `type_name` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn engine_get_type_spec(type_name: *const c_char) -> *const c_char {
    let Some(type_name) = text(type_name) else {
        buffers::set_last_error("engine_get_type_spec: null typeName");
        return ptr::null();
    };
    match dagnodes::standard_registry().type_spec_json(&type_name) {
        Ok(json) => buffers::type_spec(&json),
        Err(e) => {
            buffers::set_last_error(format!("engine_get_type_spec: {}", e));
            ptr::null()
        }
    }
}
