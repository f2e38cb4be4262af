//! Resolves the cyclic ownership between the VM engine and the emulator
//! that owns it.
//!
//! The source reached for a direct back-pointer from the VM's script
//! container to its owning debugger. Here each [`crate::emulator::Emulator`]
//! gets a stable integer token at construction; the VM engine and any
//! transaction built during a session carry that token rather than a
//! direct reference. A process-wide weak registry resolves token ->
//! emulator on demand, so a dropped session simply stops resolving instead
//! of leaking or dangling.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

use crate::emulator::EmulatorCore;

/// A stable handle identifying one debug session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(u64);

static NEXT_TOKEN: Lazy<Mutex<u64>> = Lazy::new(|| Mutex::new(1));
static REGISTRY: Lazy<Mutex<HashMap<SessionToken, Weak<Mutex<EmulatorCore>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Allocates a fresh, never-reused session token.
pub fn allocate_token() -> SessionToken {
    let mut next = NEXT_TOKEN.lock().expect("session token counter poisoned");
    let token = SessionToken(*next);
    *next += 1;
    token
}

/// Registers `core` under `token`, replacing any prior registration.
pub fn register(token: SessionToken, core: &Arc<Mutex<EmulatorCore>>) {
    REGISTRY
        .lock()
        .expect("session registry poisoned")
        .insert(token, Arc::downgrade(core));
}

/// Resolves `token` back to its owning emulator core, if the session is
/// still alive.
pub fn resolve(token: SessionToken) -> Option<Arc<Mutex<EmulatorCore>>> {
    REGISTRY
        .lock()
        .expect("session registry poisoned")
        .get(&token)
        .and_then(Weak::upgrade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn resolves_while_alive_and_not_after_drop() {
        let token = allocate_token();
        let core = Arc::new(StdMutex::new(EmulatorCore::new_for_test()));
        register(token, &core);
        assert!(resolve(token).is_some());
        drop(core);
        assert!(resolve(token).is_none());
    }
}
