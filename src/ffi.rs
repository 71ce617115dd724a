//! C entry points over a process-wide instance registry.
//!
//! Handles are opaque `u64`s, `0` meaning "no instance". Booleans come back
//! as `1`/`0`, counts as non-negative integers and failures as the negative
//! codes of [`Error::code`]. Literal arrays are borrowed for the duration of
//! the call only.

use std::{
    ffi::CStr,
    fs::File,
    os::raw::{c_char, c_int},
    slice,
    sync::Arc,
};

use parking_lot::{const_mutex, Mutex};
use tracing::debug;

use crate::{
    config::{SimpStrategy, SolverConfig},
    error::{Error, Result},
    instance::Instance,
    registry::{Handle, Registry},
    types::{LBool, Lit},
};

/// Registry slot: the instance behind its own lock, so a long solve on one
/// handle never blocks the registry or other handles.
#[derive(Clone)]
struct Shared(Arc<Mutex<Instance>>);

impl From<Instance> for Shared {
    fn from(instance: Instance) -> Self {
        Shared(Arc::new(Mutex::new(instance)))
    }
}

static INSTANCES: Mutex<Registry<Shared>> = const_mutex(Registry::new());

fn create(config: SolverConfig) -> u64 {
    match INSTANCES.lock().create_with(config) {
        Ok(handle) => handle.into_raw(),
        Err(error) => {
            debug!(%error, "instance creation failed");
            0
        }
    }
}

/// Runs `f` on the instance behind `handle`. The registry lock is released
/// before the instance is locked.
fn with<T>(handle: u64, f: impl FnOnce(&mut Instance) -> Result<T>) -> Result<T> {
    let shared = INSTANCES.lock().resolve(Handle::from_raw(handle))?.clone();
    let mut instance = shared.0.lock();
    f(&mut instance)
}

fn report(handle: u64, error: Error) -> c_int {
    debug!(handle, %error, "call failed");
    error.code()
}

fn status(handle: u64, result: Result<bool>) -> c_int {
    match result {
        Ok(value) => value as c_int,
        Err(error) => report(handle, error),
    }
}

fn count(handle: u64, result: Result<u64>) -> i64 {
    match result {
        Ok(value) => value as i64,
        Err(error) => report(handle, error) as i64,
    }
}

/// # Safety
///
/// Unless `len` is zero, `ptr` must point to `len` readable literals.
unsafe fn lits<'a>(ptr: *const Lit, len: usize) -> Result<&'a [Lit]> {
    if len == 0 {
        Ok(&[])
    } else if ptr.is_null() {
        Err(Error::NullPointer)
    } else {
        Ok(slice::from_raw_parts(ptr, len))
    }
}

fn strategy(code: u8) -> SimpStrategy {
    match code {
        0 => SimpStrategy::Never,
        2 => SimpStrategy::Always,
        _ => SimpStrategy::Once,
    }
}

/// Creates an instance with the default configuration. Returns `0` on
/// allocation failure.
#[no_mangle]
pub extern "C" fn passat_ctor() -> u64 {
    create(SolverConfig::default())
}

/// Like [`passat_ctor`]; `simp_strategy` is `0` (never), `1` (once) or
/// `2` (always) and only affects [`passat_solve_with_strategy`].
#[no_mangle]
pub extern "C" fn passat_ctor_with_strategy(simp_strategy: u8) -> u64 {
    create(SolverConfig {
        simp_strategy: strategy(simp_strategy),
        ..Default::default()
    })
}

/// Invalidates the handle and returns at once. The instance itself is
/// dropped when the last call still running on it returns.
#[no_mangle]
pub extern "C" fn passat_dtor(handle: u64) -> c_int {
    let removed = INSTANCES.lock().destroy(Handle::from_raw(handle));
    match removed {
        Ok(_) => 1,
        Err(error) => report(handle, error),
    }
}

/// Replaces the instance with a fresh one under the same handle and
/// configuration.
#[no_mangle]
pub extern "C" fn passat_reset(handle: u64) -> c_int {
    let result = with(handle, |instance| {
        instance.reset();
        Ok(true)
    });
    status(handle, result)
}

#[no_mangle]
pub extern "C" fn passat_okay(handle: u64) -> c_int {
    status(handle, with(handle, |instance| Ok(instance.okay())))
}

#[no_mangle]
pub extern "C" fn passat_nvars(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.n_vars() as u64)))
}

#[no_mangle]
pub extern "C" fn passat_nclauses(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.n_clauses() as u64)))
}

#[no_mangle]
pub extern "C" fn passat_nlearnts(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.n_learnts() as u64)))
}

#[no_mangle]
pub extern "C" fn passat_decisions(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.decisions())))
}

#[no_mangle]
pub extern "C" fn passat_propagations(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.propagations())))
}

#[no_mangle]
pub extern "C" fn passat_conflicts(handle: u64) -> i64 {
    count(handle, with(handle, |instance| Ok(instance.conflicts())))
}

/// Allocates a variable and returns its positive literal. `polarity` uses
/// the `lbool` codes: `0` true, `1` false, anything else undefined.
#[no_mangle]
pub extern "C" fn passat_new_var(handle: u64, polarity: u8, decision: bool) -> c_int {
    match with(handle, |instance| {
        Ok(instance.new_var(LBool::from_code(polarity), decision))
    }) {
        Ok(lit) => lit,
        Err(error) => report(handle, error),
    }
}

#[no_mangle]
pub extern "C" fn passat_set_polarity(handle: u64, lit: Lit, polarity: u8) -> c_int {
    let result = with(handle, |instance| {
        instance.set_polarity(lit, LBool::from_code(polarity))
    });
    status(handle, result.map(|()| true))
}

#[no_mangle]
pub extern "C" fn passat_set_decision_var(handle: u64, lit: Lit, decision: bool) -> c_int {
    let result = with(handle, |instance| instance.set_decision_var(lit, decision));
    status(handle, result.map(|()| true))
}

#[no_mangle]
pub extern "C" fn passat_set_frozen(handle: u64, lit: Lit, frozen: bool) -> c_int {
    let result = with(handle, |instance| instance.set_frozen(lit, frozen));
    status(handle, result.map(|()| true))
}

#[no_mangle]
pub extern "C" fn passat_freeze(handle: u64, lit: Lit) -> c_int {
    let result = with(handle, |instance| instance.freeze(lit));
    status(handle, result.map(|()| true))
}

#[no_mangle]
pub extern "C" fn passat_thaw(handle: u64) -> c_int {
    let result = with(handle, |instance| {
        instance.thaw();
        Ok(true)
    });
    status(handle, result)
}

#[no_mangle]
pub extern "C" fn passat_is_frozen(handle: u64, lit: Lit) -> c_int {
    status(handle, with(handle, |instance| instance.is_frozen(lit)))
}

#[no_mangle]
pub extern "C" fn passat_is_eliminated(handle: u64, lit: Lit) -> c_int {
    status(handle, with(handle, |instance| instance.is_eliminated(lit)))
}

/// Adds a clause of `len` literals. Returns `0` once the instance is
/// contradictory.
///
/// # Safety
///
/// Unless `len` is zero, `lits` must point to `len` readable literals.
#[no_mangle]
pub unsafe extern "C" fn passat_add_clause(handle: u64, lits: *const Lit, len: usize) -> c_int {
    let result = self::lits(lits, len)
        .and_then(|lits| with(handle, |instance| instance.add_clause(lits)));
    status(handle, result)
}

#[no_mangle]
pub extern "C" fn passat_add_clause_1(handle: u64, lit: Lit) -> c_int {
    unsafe { passat_add_clause(handle, &lit, 1) }
}

#[no_mangle]
pub extern "C" fn passat_add_clause_2(handle: u64, lit1: Lit, lit2: Lit) -> c_int {
    let lits = [lit1, lit2];
    unsafe { passat_add_clause(handle, lits.as_ptr(), lits.len()) }
}

#[no_mangle]
pub extern "C" fn passat_add_clause_3(handle: u64, lit1: Lit, lit2: Lit, lit3: Lit) -> c_int {
    let lits = [lit1, lit2, lit3];
    unsafe { passat_add_clause(handle, lits.as_ptr(), lits.len()) }
}

/// Solves under `len` assumption literals.
///
/// # Safety
///
/// Unless `len` is zero, `assumptions` must point to `len` readable literals.
#[no_mangle]
pub unsafe extern "C" fn passat_solve_assumptions(
    handle: u64,
    assumptions: *const Lit,
    len: usize,
    do_simp: bool,
    turn_off_simp: bool,
) -> c_int {
    let result = lits(assumptions, len).and_then(|assumptions| {
        with(handle, |instance| {
            instance.solve_assuming(assumptions, do_simp, turn_off_simp)
        })
    });
    status(handle, result)
}

#[no_mangle]
pub extern "C" fn passat_solve(handle: u64, do_simp: bool, turn_off_simp: bool) -> c_int {
    unsafe { passat_solve_assumptions(handle, std::ptr::null(), 0, do_simp, turn_off_simp) }
}

#[no_mangle]
pub extern "C" fn passat_solve_1(
    handle: u64,
    lit: Lit,
    do_simp: bool,
    turn_off_simp: bool,
) -> c_int {
    unsafe { passat_solve_assumptions(handle, &lit, 1, do_simp, turn_off_simp) }
}

#[no_mangle]
pub extern "C" fn passat_solve_2(
    handle: u64,
    lit1: Lit,
    lit2: Lit,
    do_simp: bool,
    turn_off_simp: bool,
) -> c_int {
    let lits = [lit1, lit2];
    unsafe { passat_solve_assumptions(handle, lits.as_ptr(), lits.len(), do_simp, turn_off_simp) }
}

#[no_mangle]
pub extern "C" fn passat_solve_3(
    handle: u64,
    lit1: Lit,
    lit2: Lit,
    lit3: Lit,
    do_simp: bool,
    turn_off_simp: bool,
) -> c_int {
    let lits = [lit1, lit2, lit3];
    unsafe { passat_solve_assumptions(handle, lits.as_ptr(), lits.len(), do_simp, turn_off_simp) }
}

/// Solves with the preprocessing flags chosen by the instance's strategy.
///
/// # Safety
///
/// Unless `len` is zero, `assumptions` must point to `len` readable literals.
#[no_mangle]
pub unsafe extern "C" fn passat_solve_with_strategy(
    handle: u64,
    assumptions: *const Lit,
    len: usize,
) -> c_int {
    let result = lits(assumptions, len).and_then(|assumptions| {
        with(handle, |instance| instance.solve_with_strategy(assumptions))
    });
    status(handle, result)
}

#[no_mangle]
pub extern "C" fn passat_simplify(handle: u64) -> c_int {
    status(handle, with(handle, |instance| Ok(instance.simplify())))
}

#[no_mangle]
pub extern "C" fn passat_eliminate(handle: u64, turn_off_simp: bool) -> c_int {
    status(handle, with(handle, |instance| Ok(instance.eliminate(turn_off_simp))))
}

/// `lbool` code of `lit` in the current model: `0` true, `1` false, `2`
/// unassigned.
#[no_mangle]
pub extern "C" fn passat_model_value(handle: u64, lit: Lit) -> c_int {
    match with(handle, |instance| instance.model_value(lit)) {
        Ok(value) => value.code() as c_int,
        Err(error) => report(handle, error),
    }
}

/// Strict model query: unassigned literals are an error.
#[no_mangle]
pub extern "C" fn passat_value(handle: u64, lit: Lit) -> c_int {
    status(handle, with(handle, |instance| instance.value(lit)))
}

/// Copies the model into `out` as `0`/`1` bytes, entry `i` holding variable
/// `i` (entry `0` unused). Returns the size the buffer needs; nothing is
/// written if `capacity` is smaller.
///
/// # Safety
///
/// Unless `capacity` is zero, `out` must point to `capacity` writable bytes.
#[no_mangle]
pub unsafe extern "C" fn passat_get_model(handle: u64, out: *mut u8, capacity: usize) -> i64 {
    let result = with(handle, |instance| instance.get_model()).and_then(|model| {
        if capacity >= model.len() {
            if out.is_null() {
                return Err(Error::NullPointer);
            }
            let out = slice::from_raw_parts_mut(out, model.len());
            for (slot, value) in out.iter_mut().zip(&model) {
                *slot = *value as u8;
            }
        }
        Ok(model.len() as u64)
    });
    count(handle, result)
}

/// Writes the instance to the file at `path` in DIMACS CNF.
///
/// # Safety
///
/// `path` must be a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn passat_write_dimacs(handle: u64, path: *const c_char) -> c_int {
    if path.is_null() {
        return report(handle, Error::NullPointer);
    }
    let path = CStr::from_ptr(path).to_string_lossy().into_owned();
    let result = with(handle, |instance| {
        let mut file = File::create(&path)?;
        instance.write_dimacs(&mut file)?;
        Ok(true)
    });
    status(handle, result)
}
