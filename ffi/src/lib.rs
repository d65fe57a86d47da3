/*
 * lib.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Mailrow, mail archive steps for row pipelines.
 *
 * Mailrow is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Mailrow is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Mailrow.  If not, see <http://www.gnu.org/licenses/>.
 */

//! C FFI for mailrow core. Steps are identified by opaque step ids.
//! Schemas and rows cross the boundary as JSON: a schema is an array of
//! `{"name", "type", "origin"}` objects, a row is an array of values read
//! positionally against a schema.
//! Functions returning `char *` allocate; free with mailrow_free_string.
//! All string parameters are UTF-8 NUL-terminated.

use libc::{c_char, c_int, c_void};
use mailrow_core::config::{default_config_path, load_config};
use mailrow_core::{
    create_step, describe_output_schema, ArchiveWalker, MailrowConfig, Row, RowSchema, RowSink,
    Step, StepError, StepKind, StepSettings,
};
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Row callback: row as a JSON array, user_data. Return 0 to continue, nonzero to stop.
type OnRow = extern "C" fn(*const c_char, *mut c_void) -> c_int;

/// A step plus the input schema it was prepared with.
struct StepHolder {
    step: Box<dyn Step>,
    input_schema: Option<RowSchema>,
}

/// Registry of live steps keyed by step id, plus the process-wide config.
struct Registry {
    config: RwLock<MailrowConfig>,
    steps: RwLock<HashMap<String, Arc<Mutex<StepHolder>>>>,
    step_counter: AtomicU64,
}

fn registry() -> &'static Registry {
    static REGISTRY: once_cell::sync::OnceCell<Registry> = once_cell::sync::OnceCell::new();
    REGISTRY.get_or_init(|| Registry {
        config: RwLock::new(MailrowConfig::default()),
        steps: RwLock::new(HashMap::new()),
        step_counter: AtomicU64::new(0),
    })
}

fn current_config() -> MailrowConfig {
    registry()
        .config
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

fn find_step(step_id: &str) -> Option<Arc<Mutex<StepHolder>>> {
    registry()
        .steps
        .read()
        .ok()
        .and_then(|g| g.get(step_id).cloned())
}

fn ptr_to_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string()) }
}

fn into_c_string(s: String) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => {
            set_last_error("string contains NUL");
            ptr::null_mut()
        }
    }
}

thread_local! {
    static LAST_ERROR: std::cell::RefCell<Option<CString>> = std::cell::RefCell::new(None);
}

fn set_last_error(err: impl Display) {
    let msg = CString::new(err.to_string().replace('\0', " "))
        .unwrap_or_default();
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(msg));
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn required_str(ptr: *const c_char, what: &str) -> Result<String, String> {
    ptr_to_str(ptr).ok_or_else(|| format!("{} is null or not valid UTF-8", what))
}

fn parse_schema(json: &str) -> Result<RowSchema, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid schema: {}", e))
}

fn parse_row(schema: &RowSchema, json: &str) -> Result<Row, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("invalid row: {}", e))?;
    schema.row_from_json(&value).map_err(|e| e.to_string())
}

/// Forwards rows to a host callback as JSON.
struct CallbackSink {
    on_row: OnRow,
    user_data: *mut c_void,
    rows: u64,
}

impl RowSink for CallbackSink {
    fn put_row(&mut self, row: Row) -> Result<(), StepError> {
        let json = RowSchema::row_to_json(&row).to_string();
        let c = CString::new(json).map_err(|e| StepError::Sink(e.to_string()))?;
        if (self.on_row)(c.as_ptr(), self.user_data) != 0 {
            return Err(StepError::Sink("host stopped the row stream".to_string()));
        }
        self.rows += 1;
        Ok(())
    }
}

/// Version string (static, do not free).
#[no_mangle]
pub extern "C" fn mailrow_version() -> *const c_char {
    b"0.1.0\0".as_ptr() as *const c_char
}

/// Last error message from a failed call. Valid until next FFI call. Do not free.
#[no_mangle]
pub extern "C" fn mailrow_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string returned by this library. No-op if ptr is NULL.
#[no_mangle]
pub unsafe extern "C" fn mailrow_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}

/// Route `log` output to stderr. level: "error", "warn", "info", "debug", "trace" or NULL
/// (RUST_LOG, else "info"). Returns 0, 1 if logging was already initialized, -1 on an
/// unknown level.
#[no_mangle]
pub unsafe extern "C" fn mailrow_init_logging(level: *const c_char) -> c_int {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = ptr_to_str(level) {
        match level.parse::<log::LevelFilter>() {
            Ok(filter) => {
                builder.filter_level(filter);
            }
            Err(_) => {
                set_last_error(format!("unknown log level {:?}", level));
                return -1;
            }
        }
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Info);
    }
    clear_last_error();
    match builder.try_init() {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

/// Load the process-wide config from path, or ~/.mailrow/config.json when NULL.
/// A missing file yields defaults. Applies to steps created afterwards. Returns 0 or -1.
#[no_mangle]
pub unsafe extern "C" fn mailrow_load_config(path: *const c_char) -> c_int {
    let path: Option<PathBuf> = ptr_to_str(path).map(PathBuf::from).or_else(default_config_path);
    let config = match path {
        Some(p) => match load_config(&p) {
            Ok(c) => c,
            Err(e) => {
                set_last_error(e);
                return -1;
            }
        },
        None => MailrowConfig::default(),
    };
    match registry().config.write() {
        Ok(mut guard) => *guard = config,
        Err(_) => {
            set_last_error("config lock poisoned");
            return -1;
        }
    }
    clear_last_error();
    0
}

/// Output schema of a walk: input schema followed by the message columns. origin may be
/// NULL. Returns schema JSON (caller frees), or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mailrow_describe_output_schema(
    input_schema_json: *const c_char,
    origin: *const c_char,
) -> *mut c_char {
    let result = required_str(input_schema_json, "input_schema_json")
        .and_then(|json| parse_schema(&json))
        .map(|schema| {
            let origin = ptr_to_str(origin);
            describe_output_schema(&schema, origin.as_deref())
        })
        .and_then(|out| serde_json::to_string(&out).map_err(|e| e.to_string()));
    match result {
        Ok(json) => {
            clear_last_error();
            into_c_string(json)
        }
        Err(e) => {
            set_last_error(e);
            ptr::null_mut()
        }
    }
}

/// Walk one archive. template_json is a row of input_schema_json; every output row is the
/// template followed by the message columns and is passed to on_row.
/// Returns the number of rows delivered, or -1 on error (open, read, extraction, or the
/// host stopping the stream; see mailrow_last_error).
#[no_mangle]
pub unsafe extern "C" fn mailrow_walk(
    archive_path: *const c_char,
    input_schema_json: *const c_char,
    template_json: *const c_char,
    on_row: Option<OnRow>,
    user_data: *mut c_void,
) -> i64 {
    let setup = (|| -> Result<(String, Row, OnRow), String> {
        let path = required_str(archive_path, "archive_path")?;
        let schema = parse_schema(&required_str(input_schema_json, "input_schema_json")?)?;
        let template = parse_row(&schema, &required_str(template_json, "template_json")?)?;
        let on_row = on_row.ok_or_else(|| "on_row is null".to_string())?;
        Ok((path, template, on_row))
    })();
    let (path, template, on_row) = match setup {
        Ok(s) => s,
        Err(e) => {
            set_last_error(e);
            return -1;
        }
    };
    let walker = ArchiveWalker::from_config(&current_config());
    let walk = match walker.walk(Path::new(&path), template) {
        Ok(w) => w,
        Err(e) => {
            set_last_error(e);
            return -1;
        }
    };
    let mut sink = CallbackSink {
        on_row,
        user_data,
        rows: 0,
    };
    for result in walk {
        let outcome = match result {
            Ok(row) => sink.put_row(row),
            Err(e) => Err(StepError::Walk(e)),
        };
        if let Err(e) = outcome {
            set_last_error(e);
            return -1;
        }
    }
    clear_last_error();
    sink.rows as i64
}

/// Create a step. kind_id: "PstInputStep" or "BinaryFileOutputStep". settings_json: JSON
/// object of settings, or NULL for defaults. Returns step id (caller frees), or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_new(
    kind_id: *const c_char,
    name: *const c_char,
    settings_json: *const c_char,
) -> *mut c_char {
    let built = (|| -> Result<Box<dyn Step>, String> {
        let kind = StepKind::from_id(&required_str(kind_id, "kind_id")?).map_err(|e| e.to_string())?;
        let name = ptr_to_str(name).unwrap_or_else(|| kind.id().to_string());
        let mut step = create_step(kind, &name, None, &current_config());
        if let Some(json) = ptr_to_str(settings_json) {
            let value: serde_json::Value =
                serde_json::from_str(&json).map_err(|e| format!("invalid settings: {}", e))?;
            let mut settings: StepSettings = step.settings().clone();
            settings.load_json(&value).map_err(|e| e.to_string())?;
            step = create_step(kind, &name, Some(&settings), &current_config());
        }
        Ok(step)
    })();
    let step = match built {
        Ok(s) => s,
        Err(e) => {
            set_last_error(e);
            return ptr::null_mut();
        }
    };
    let n = registry().step_counter.fetch_add(1, Ordering::Relaxed) + 1;
    let id = format!("step:{}", n);
    log::debug!("created {} {} ({})", step.kind(), id, step.name());
    let holder = StepHolder {
        step,
        input_schema: None,
    };
    match registry().steps.write() {
        Ok(mut guard) => {
            guard.insert(id.clone(), Arc::new(Mutex::new(holder)));
        }
        Err(_) => {
            set_last_error("step registry lock poisoned");
            return ptr::null_mut();
        }
    }
    clear_last_error();
    into_c_string(id)
}

/// Run design-time checks. input_schema_json may be NULL (no input).
/// Returns a JSON array of `{"status", "message"}` (caller frees), or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_check(
    step_id: *const c_char,
    input_schema_json: *const c_char,
) -> *mut c_char {
    let result = (|| -> Result<String, String> {
        let id = required_str(step_id, "step_id")?;
        let holder = find_step(&id).ok_or_else(|| format!("unknown step {}", id))?;
        let schema = match ptr_to_str(input_schema_json) {
            Some(json) => Some(parse_schema(&json)?),
            None => None,
        };
        let guard = holder.lock().map_err(|_| "step lock poisoned".to_string())?;
        let remarks = guard.step.check(schema.as_ref());
        serde_json::to_string(&remarks).map_err(|e| e.to_string())
    })();
    match result {
        Ok(json) => {
            clear_last_error();
            into_c_string(json)
        }
        Err(e) => {
            set_last_error(e);
            ptr::null_mut()
        }
    }
}

/// Output schema of the step for the given input schema. Returns schema JSON (caller
/// frees), or NULL on error.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_output_schema(
    step_id: *const c_char,
    input_schema_json: *const c_char,
) -> *mut c_char {
    let result = (|| -> Result<String, String> {
        let id = required_str(step_id, "step_id")?;
        let holder = find_step(&id).ok_or_else(|| format!("unknown step {}", id))?;
        let schema = parse_schema(&required_str(input_schema_json, "input_schema_json")?)?;
        let guard = holder.lock().map_err(|_| "step lock poisoned".to_string())?;
        serde_json::to_string(&guard.step.describe_output_schema(&schema)).map_err(|e| e.to_string())
    })();
    match result {
        Ok(json) => {
            clear_last_error();
            into_c_string(json)
        }
        Err(e) => {
            set_last_error(e);
            ptr::null_mut()
        }
    }
}

/// Prepare the step for rows of input_schema_json. Must precede mailrow_step_process_row.
/// Returns 0 or -1.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_prepare(
    step_id: *const c_char,
    input_schema_json: *const c_char,
) -> c_int {
    let result = (|| -> Result<(), String> {
        let id = required_str(step_id, "step_id")?;
        let holder = find_step(&id).ok_or_else(|| format!("unknown step {}", id))?;
        let schema = parse_schema(&required_str(input_schema_json, "input_schema_json")?)?;
        let mut guard = holder.lock().map_err(|_| "step lock poisoned".to_string())?;
        guard.step.prepare(&schema).map_err(|e| e.to_string())?;
        guard.input_schema = Some(schema);
        Ok(())
    })();
    match result {
        Ok(()) => {
            clear_last_error();
            0
        }
        Err(e) => {
            set_last_error(e);
            -1
        }
    }
}

/// Feed one input row (JSON array, read against the prepared schema). Output rows go to
/// on_row. Returns the number of rows emitted, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_process_row(
    step_id: *const c_char,
    row_json: *const c_char,
    on_row: Option<OnRow>,
    user_data: *mut c_void,
) -> i64 {
    let result = (|| -> Result<u64, String> {
        let id = required_str(step_id, "step_id")?;
        let holder = find_step(&id).ok_or_else(|| format!("unknown step {}", id))?;
        let on_row = on_row.ok_or_else(|| "on_row is null".to_string())?;
        let mut guard = holder.lock().map_err(|_| "step lock poisoned".to_string())?;
        let schema = guard
            .input_schema
            .clone()
            .ok_or_else(|| StepError::NotPrepared(id.clone()).to_string())?;
        let row = parse_row(&schema, &required_str(row_json, "row_json")?)?;
        let mut sink = CallbackSink {
            on_row,
            user_data,
            rows: 0,
        };
        guard
            .step
            .process_row(&row, &mut sink)
            .map_err(|e| e.to_string())?;
        Ok(sink.rows)
    })();
    match result {
        Ok(n) => {
            clear_last_error();
            n as i64
        }
        Err(e) => {
            set_last_error(e);
            -1
        }
    }
}

/// Dispose the step and remove it from the registry. No-op for unknown ids.
#[no_mangle]
pub unsafe extern "C" fn mailrow_step_free(step_id: *const c_char) {
    let Some(id) = ptr_to_str(step_id) else {
        return;
    };
    let removed = registry().steps.write().ok().and_then(|mut g| g.remove(&id));
    if let Some(holder) = removed {
        if let Ok(mut guard) = holder.lock() {
            guard.step.dispose();
        }
        log::debug!("freed {}", id);
    }
}
