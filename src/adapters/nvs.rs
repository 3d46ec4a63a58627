//! NVS (Non-Volatile Storage) adapter for the mode byte.
//!
//! Implements [`ModeStorePort`]. The mode index lives as a single `u8`
//! under `spritz::mode`. A missing key reads back as [`MODE_UNSET`], the
//! same value an erased EEPROM cell would hold. ESP-IDF NVS commits are
//! atomic per `nvs_commit()`.
//!
//! The simulation backend keeps the byte in memory.

use crate::app::ports::{MODE_UNSET, ModeStorePort, StorageError};
use log::info;

#[cfg(not(target_os = "espidf"))]
use core::cell::Cell;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
const NAMESPACE: &core::ffi::CStr = c"spritz";
#[cfg(target_os = "espidf")]
const MODE_KEY: &core::ffi::CStr = c"mode";

pub struct NvsModeStore {
    available: bool,
    #[cfg(not(target_os = "espidf"))]
    cell: Cell<Option<u8>>,
}

impl NvsModeStore {
    /// Initialise NVS flash and return a store bound to it.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(StorageError::Unavailable);
            }
            info!("NvsModeStore: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsModeStore: simulation backend");

        Ok(Self {
            available: true,
            #[cfg(not(target_os = "espidf"))]
            cell: Cell::new(None),
        })
    }

    /// A store whose every access fails with [`StorageError::Unavailable`].
    /// Used when NVS cannot be brought up; the device still runs on defaults.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            #[cfg(not(target_os = "espidf"))]
            cell: Cell::new(None),
        }
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    ) -> Result<T, esp_err_t> {
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        // SAFETY: NAMESPACE is NUL-terminated; handle is closed below.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr(), mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }
}

impl ModeStorePort for NvsModeStore {
    #[cfg(target_os = "espidf")]
    fn read_mode(&self) -> Result<u8, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        let result = Self::with_handle(false, |handle| {
            let mut value: u8 = MODE_UNSET;
            // SAFETY: MODE_KEY is NUL-terminated; value outlives the call.
            let ret = unsafe { nvs_get_u8(handle, MODE_KEY.as_ptr(), &mut value) };
            if ret == ESP_OK as esp_err_t {
                Ok(value)
            } else {
                Err(ret)
            }
        });
        match result {
            Ok(v) => Ok(v),
            // Fresh device: neither namespace nor key exist yet.
            Err(rc) if rc == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Ok(MODE_UNSET),
            Err(rc) => {
                warn!("NVS: mode read failed (rc={})", rc);
                Err(StorageError::IoError)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn write_mode(&mut self, value: u8) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Self::with_handle(true, |handle| {
            // SAFETY: see read_mode.
            let ret = unsafe { nvs_set_u8(handle, MODE_KEY.as_ptr(), value) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(|rc| {
            warn!("NVS: mode write failed (rc={})", rc);
            StorageError::IoError
        })?;
        info!("NvsModeStore: mode {} committed", value);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_mode(&self) -> Result<u8, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Ok(self.cell.get().unwrap_or(MODE_UNSET))
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_mode(&mut self, value: u8) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.cell.set(Some(value));
        info!("NvsModeStore: mode {} stored", value);
        Ok(())
    }
}
