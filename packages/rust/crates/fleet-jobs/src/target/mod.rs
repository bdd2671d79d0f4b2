//! Polymorphic job targets: `{kind, id}` references resolved through a registry.

mod inventory;
mod registry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use inventory::MemoryInventory;
pub use registry::{TargetLookup, TargetRegistry};

/// Entity kinds a job can operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Virtual machine or template.
    VmOrTemplate,
    /// Container image.
    ContainerImage,
    /// Fleet server.
    MiqServer,
}

impl TargetKind {
    pub const ALL: [Self; 3] = [Self::VmOrTemplate, Self::ContainerImage, Self::MiqServer];

    /// Settings key (`snake_case`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VmOrTemplate => "vm_or_template",
            Self::ContainerImage => "container_image",
            Self::MiqServer => "miq_server",
        }
    }

    /// Inverse of [`TargetKind::as_str`].
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim() {
            "vm_or_template" => Some(Self::VmOrTemplate),
            "container_image" => Some(Self::ContainerImage),
            "miq_server" => Some(Self::MiqServer),
            _ => None,
        }
    }

    /// Queue `class_name` used when routing messages to this kind.
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::VmOrTemplate => "VmOrTemplate",
            Self::ContainerImage => "ContainerImage",
            Self::MiqServer => "MiqServer",
        }
    }

    /// Inverse of [`TargetKind::class_name`].
    pub fn from_class_name(class_name: &str) -> Option<Self> {
        match class_name {
            "VmOrTemplate" => Some(Self::VmOrTemplate),
            "ContainerImage" => Some(Self::ContainerImage),
            "MiqServer" => Some(Self::MiqServer),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Reference to the entity a job operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: u64,
}

impl TargetRef {
    pub const fn new(kind: TargetKind, id: u64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Resolved target entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntity {
    pub kind: TargetKind,
    pub id: u64,
    pub name: String,
    /// Zone of the provider managing this entity.
    pub zone: Option<String>,
}

impl TargetEntity {
    pub fn target_ref(&self) -> TargetRef {
        TargetRef::new(self.kind, self.id)
    }
}
