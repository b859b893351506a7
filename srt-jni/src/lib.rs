//! JVM glue for the SRT bridge
//!
//! Loaded by the managed runtime as a shared library. `JNI_OnLoad` reads the
//! [`BridgeConfig`], loads libsrt, installs the [`BridgeContext`] and
//! registers the native methods of every managed class.

pub mod config;
pub mod error;
pub mod heap;
pub mod logging;
pub mod methods;
pub mod natives;
pub mod registry;

pub use config::{BridgeConfig, ClassNames, ConfigError};
pub use error::GlueError;
pub use heap::{Heap, JniHeap, ManagedEnum};

use jni::sys::{jint, JNI_ERR, JNI_VERSION_1_6};
use jni::JavaVM;
use parking_lot::RwLock;
use srt_bridge::Bridge;
use srt_sys::SrtLibrary;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Everything a native method needs
pub struct BridgeContext {
    pub bridge: Bridge,
    pub classes: ClassNames,
}

static CONTEXT: RwLock<Option<Arc<BridgeContext>>> = parking_lot::const_rwlock(None);

/// The loaded context, if any
///
/// Callers get their own reference, so no lock is held across an SRT call.
pub fn context() -> Option<Arc<BridgeContext>> {
    CONTEXT.read().clone()
}

/// Install `ctx`, returning the one it replaces
pub fn install(ctx: BridgeContext) -> Option<Arc<BridgeContext>> {
    CONTEXT.write().replace(Arc::new(ctx))
}

pub fn uninstall() -> Option<Arc<BridgeContext>> {
    CONTEXT.write().take()
}

fn load(vm: *mut jni::sys::JavaVM) -> Result<(), GlueError> {
    let config = BridgeConfig::load()?;
    logging::init_tracing(&config.log.filter);

    let library = SrtLibrary::open(config.library.candidates())?;
    install(BridgeContext {
        bridge: Bridge::new(Arc::new(library)),
        classes: config.classes.clone(),
    });

    // SAFETY: the pointer comes from the JVM loading this library
    let vm = unsafe { JavaVM::from_raw(vm) }?;
    let mut env = vm.get_env()?;
    registry::register_all(&mut env, &config.classes)
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn JNI_OnLoad(vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    match panic::catch_unwind(AssertUnwindSafe(|| load(vm))) {
        Ok(Ok(())) => {
            tracing::info!("SRT bridge loaded");
            JNI_VERSION_1_6
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to load SRT bridge: {}", e);
            uninstall();
            JNI_ERR
        }
        Err(_) => {
            tracing::error!("Failed to load SRT bridge: panicked");
            uninstall();
            JNI_ERR
        }
    }
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn JNI_OnUnload(_vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) {
    if uninstall().is_some() {
        tracing::info!("SRT bridge unloaded");
    }
}
