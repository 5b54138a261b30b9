/// Backend registry - process-wide table of compiled-in, usable backends
///
/// The table is built on first use and never changes afterwards. A backend is
/// listed when its Cargo feature is enabled, its native API is usable on this
/// machine and it implements the current backend interface version.

use std::sync::OnceLock;

use candid_core::candid::backend::{Backend, BackendKind, BACKEND_INTERFACE_VERSION};
use candid_core::{candid_debug, candid_warn};

const SOURCE: &str = "candid::Registry";

/// Backend slots indexed by `BackendKind::index()`; the `Auto` slot stays empty
pub(crate) type BackendTable = [Option<&'static dyn Backend>; BackendKind::COUNT];

static REGISTRY: OnceLock<BackendTable> = OnceLock::new();

/// Native API first, then the cross-platform ones
#[cfg(any(target_os = "macos", target_os = "ios"))]
const PREFERENCE: &[BackendKind] = &[BackendKind::Metal, BackendKind::Vulkan, BackendKind::WebGpu];

#[cfg(target_os = "windows")]
const PREFERENCE: &[BackendKind] = &[BackendKind::D3D12, BackendKind::Vulkan, BackendKind::WebGpu];

#[cfg(target_arch = "wasm32")]
const PREFERENCE: &[BackendKind] = &[BackendKind::WebGpu];

#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "windows", target_arch = "wasm32")))]
const PREFERENCE: &[BackendKind] = &[BackendKind::Vulkan, BackendKind::WebGpu];

// ===== TABLE CONSTRUCTION =====

/// Backends compiled into this build
fn compiled_backends() -> Vec<&'static dyn Backend> {
    #[allow(unused_mut)]
    let mut backends: Vec<&'static dyn Backend> = Vec::new();
    #[cfg(feature = "vulkan")]
    backends.push(&candid_renderer_vulkan::VULKAN_BACKEND);
    backends
}

/// Build a table from candidate backends, dropping unusable ones
pub(crate) fn build_table(candidates: &[&'static dyn Backend]) -> BackendTable {
    let mut table: BackendTable = [None; BackendKind::COUNT];

    for &backend in candidates {
        let kind = backend.kind();
        if !kind.is_concrete() {
            candid_warn!(SOURCE, "Backend '{}' reports kind Auto, skipped", backend.name());
            continue;
        }
        if backend.interface_version() != BACKEND_INTERFACE_VERSION {
            candid_warn!(SOURCE, "Backend '{}' implements interface version {} (expected {}), skipped",
                backend.name(), backend.interface_version(), BACKEND_INTERFACE_VERSION);
            continue;
        }
        if table[kind.index()].is_some() {
            candid_warn!(SOURCE, "Backend '{}' registered twice for {}, keeping the first", backend.name(), kind);
            continue;
        }
        if !backend.is_supported() {
            candid_debug!(SOURCE, "Backend '{}' is compiled in but not supported on this machine", backend.name());
            continue;
        }
        candid_debug!(SOURCE, "Registered backend '{}' ({})", backend.name(), kind);
        table[kind.index()] = Some(backend);
    }

    table
}

fn table() -> &'static BackendTable {
    REGISTRY.get_or_init(|| build_table(&compiled_backends()))
}

// ===== TABLE QUERIES =====

pub(crate) fn preferred_in(table: &BackendTable) -> Option<BackendKind> {
    PREFERENCE.iter().copied().find(|kind| table[kind.index()].is_some())
}

pub(crate) fn get_in(table: &BackendTable, kind: BackendKind) -> Option<&'static dyn Backend> {
    let kind = match kind {
        BackendKind::Auto => preferred_in(table)?,
        kind => kind,
    };
    table[kind.index()]
}

pub(crate) fn is_available_in(table: &BackendTable, kind: BackendKind) -> bool {
    match kind {
        BackendKind::Auto => preferred_in(table).is_some(),
        kind => table[kind.index()].is_some(),
    }
}

pub(crate) fn available_in(table: &BackendTable, out: &mut [BackendKind]) -> usize {
    let mut count = 0;
    for (slot, kind) in out.iter_mut().zip(
        BackendKind::ALL_CONCRETE.iter().copied().filter(|kind| table[kind.index()].is_some()),
    ) {
        *slot = kind;
        count += 1;
    }
    count
}

// ===== PUBLIC API =====

/// Backend for `kind`, resolving `Auto` to the preferred backend
///
/// Returns `None` when the backend is not compiled in or not usable here.
pub fn get(kind: BackendKind) -> Option<&'static dyn Backend> {
    get_in(table(), kind)
}

/// Highest priority available backend for this platform, `None` if there is none
pub fn get_preferred() -> Option<BackendKind> {
    preferred_in(table())
}

/// True when `get(kind)` would return a backend
pub fn is_available(kind: BackendKind) -> bool {
    is_available_in(table(), kind)
}

/// Write available backends into `out` in ascending enum order
///
/// At most `out.len()` entries are written; returns how many were. Never allocates.
pub fn get_available(out: &mut [BackendKind]) -> usize {
    available_in(table(), out)
}

/// Every available backend in ascending enum order
pub fn available_backends() -> Vec<BackendKind> {
    let mut out = [BackendKind::Auto; BackendKind::COUNT];
    let count = get_available(&mut out);
    out[..count].to_vec()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
