use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// JSON key-value storage seam. The WASM build runs against the Spin
/// key-value store; the native binary and the test suite run against
/// [`MemStore`].
pub trait Kv {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>>;
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

impl Kv for spin_sdk::key_value::Store {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        Ok(spin_sdk::key_value::Store::get_json(self, key)?)
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::set_json(self, key, value)?)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        Ok(spin_sdk::key_value::Store::delete(self, key)?)
    }
}

/// Process-local store backing the native binary and the tests.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Kv for MemStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let map = self.inner.lock().expect("store mutex poisoned");
        match map.get(key) {
            Some(raw) => Ok(Some(serde_json::from_slice(raw)?)),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        map.insert(key.to_string(), serde_json::to_vec(value)?);
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        map.remove(key);
        Ok(())
    }
}
