use log::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::gpio::GpioBackend;

pub fn export_pins<B: GpioBackend>(backend: &B, pins: &[u32]) -> Result<(), AppError> {
    for pin_id in pins {
        backend.export(*pin_id)?;
    }
    Ok(())
}

pub fn unexport_pins<B: GpioBackend>(backend: &B, pins: &[u32]) -> Result<(), AppError> {
    for pin_id in pins {
        backend.unexport(*pin_id)?;
    }
    Ok(())
}

pub fn acquire<B: GpioBackend>(backend: &B, config: &AppConfig) -> Result<(), AppError> {
    if config.no_export {
        info!("export disabled, using pins as found");
        return Ok(());
    }
    export_pins(backend, &config.pins)
}

pub fn release<B: GpioBackend>(backend: &B, config: &AppConfig) -> Result<(), AppError> {
    if config.no_export {
        return Ok(());
    }
    unexport_pins(backend, &config.pins)?;
    info!("released {} pin(s)", config.pins.len());
    Ok(())
}
