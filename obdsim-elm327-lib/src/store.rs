//! Current value of every measurable quantity.

use serde::{Deserialize, Serialize};

use crate::counter::Tachometer;

/// A quantity the simulator can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measurement {
    /// km/h
    VehicleSpeed,
    /// °C
    CoolantTemp,
    /// °C
    OilTemp,
    /// °C
    AmbientAirTemp,
    /// kPa
    IntakeManifoldPressure,
    /// Percent, 0..=100
    FuelLevel,
    /// rpm
    EngineSpeed,
    /// psi
    BoostPressure,
    /// Raw 10-bit analog reading
    AnalogSensor,
    /// °C
    TransmissionTemp,
}

impl Measurement {
    pub const ALL: [Self; 10] = [
        Self::VehicleSpeed,
        Self::CoolantTemp,
        Self::OilTemp,
        Self::AmbientAirTemp,
        Self::IntakeManifoldPressure,
        Self::FuelLevel,
        Self::EngineSpeed,
        Self::BoostPressure,
        Self::AnalogSensor,
        Self::TransmissionTemp,
    ];
}

/// A live analog line sampled once per refresh
pub trait AnalogInput {
    /// Raw reading, 0..=1023
    fn read(&mut self) -> u16;
}

impl<F: FnMut() -> u16> AnalogInput for F {
    fn read(&mut self) -> u16 {
        self()
    }
}

/// Fixed values standing in for real sensor reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub vehicle_speed: f32,
    pub coolant_temp: f32,
    pub oil_temp: f32,
    pub ambient_air_temp: f32,
    pub intake_manifold_pressure: f32,
    pub fuel_level: f32,
    pub boost_pressure: f32,
    pub transmission_temp: f32,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            vehicle_speed: 60.0,
            coolant_temp: 93.0,
            oil_temp: 95.0,
            ambient_air_temp: 22.0,
            intake_manifold_pressure: 101.0,
            fuel_level: 89.0,
            boost_pressure: 14.0,
            transmission_temp: 82.0,
        }
    }
}

/// Snapshot of all measurements, refreshed once per cycle
#[derive(Debug, Clone, PartialEq)]
pub struct ValueStore {
    placeholders: Placeholders,
    initial_engine_speed: f32,
    engine_speed: f32,
    analog: u16,
}

impl ValueStore {
    #[must_use]
    pub fn new(placeholders: Placeholders, initial_engine_speed: f32) -> Self {
        Self {
            placeholders,
            initial_engine_speed,
            engine_speed: initial_engine_speed,
            analog: 0,
        }
    }

    #[must_use]
    pub fn get(&self, m: Measurement) -> f32 {
        let p = &self.placeholders;
        match m {
            Measurement::VehicleSpeed => p.vehicle_speed,
            Measurement::CoolantTemp => p.coolant_temp,
            Measurement::OilTemp => p.oil_temp,
            Measurement::AmbientAirTemp => p.ambient_air_temp,
            Measurement::IntakeManifoldPressure => p.intake_manifold_pressure,
            Measurement::FuelLevel => p.fuel_level,
            Measurement::EngineSpeed => self.engine_speed,
            Measurement::BoostPressure => p.boost_pressure,
            Measurement::AnalogSensor => f32::from(self.analog),
            Measurement::TransmissionTemp => p.transmission_temp,
        }
    }

    /// Update every measurement for this cycle.
    ///
    /// Engine speed only changes when the tachometer has seen enough
    /// pulses; otherwise the last computed value is kept.
    pub fn refresh(&mut self, tach: &mut Tachometer, analog: &mut dyn AnalogInput, now_us: u64) {
        if let Some(speed) = tach.poll(now_us) {
            self.engine_speed = speed;
        }
        self.analog = analog.read();
    }

    /// Return engine speed to its power-on value
    pub fn reset_engine_speed(&mut self) {
        self.engine_speed = self.initial_engine_speed;
    }
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new(Placeholders::default(), crate::config::DEFAULT_INITIAL_ENGINE_SPEED)
    }
}
