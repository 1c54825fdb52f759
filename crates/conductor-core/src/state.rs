//! Saved processor state.

use crate::types::{BlobData, ObjectId};
use serde::{Deserialize, Serialize};

/// Everything needed to restore a processor: program, bypass, parameters,
/// properties, or an opaque blob for formats that serialize themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorState {
    program: Option<i32>,
    bypassed: Option<bool>,
    parameters: Vec<(ObjectId, f32)>,
    properties: Vec<(ObjectId, String)>,
    binary_data: BlobData,
}

impl ProcessorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_program(&mut self, program: i32) {
        self.program = Some(program);
    }

    pub fn set_bypass(&mut self, bypassed: bool) {
        self.bypassed = Some(bypassed);
    }

    /// `value` is normalized.
    pub fn add_parameter_change(&mut self, parameter_id: ObjectId, value: f32) {
        self.parameters.push((parameter_id, value));
    }

    pub fn add_property_change(&mut self, property_id: ObjectId, value: impl Into<String>) {
        self.properties.push((property_id, value.into()));
    }

    pub fn set_binary_data(&mut self, data: BlobData) {
        self.binary_data = data;
    }

    pub fn program(&self) -> Option<i32> {
        self.program
    }

    pub fn bypassed(&self) -> Option<bool> {
        self.bypassed
    }

    pub fn parameters(&self) -> &[(ObjectId, f32)] {
        &self.parameters
    }

    pub fn properties(&self) -> &[(ObjectId, String)] {
        &self.properties
    }

    pub fn binary_data(&self) -> &[u8] {
        &self.binary_data
    }

    pub fn has_binary_data(&self) -> bool {
        !self.binary_data.is_empty()
    }
}

/// The subset of [`ProcessorState`] the audio thread can apply directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtState {
    bypassed: Option<bool>,
    parameters: Vec<(ObjectId, f32)>,
}

impl RtState {
    pub fn bypassed(&self) -> Option<bool> {
        self.bypassed
    }

    pub fn parameters(&self) -> &[(ObjectId, f32)] {
        &self.parameters
    }
}

impl From<&ProcessorState> for RtState {
    fn from(state: &ProcessorState) -> Self {
        Self {
            bypassed: state.bypassed,
            parameters: state.parameters.clone(),
        }
    }
}
