use chrono::{DateTime, Utc};

use crate::job::JobRecord;

use super::TaskRecord;

/// Job fields mirrored onto the linked task, already in task shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAttributes {
    pub name: String,
    /// Capitalized job status.
    pub status: String,
    /// Capitalized job state.
    pub state: String,
    pub message: String,
    pub userid: Option<String>,
    pub miq_server_id: Option<u64>,
    /// Mirrors job `context`.
    pub context_data: Option<String>,
    pub zone: Option<String>,
    pub started_on: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Field mapping used to synchronize the linked task.
    pub fn attributes_for_task(&self) -> TaskAttributes {
        TaskAttributes {
            name: self.name.clone(),
            status: capitalize(self.status.as_str()),
            state: capitalize(&self.state),
            message: self.message.clone(),
            userid: self.userid.clone(),
            miq_server_id: self.miq_server_id,
            context_data: self.context.clone(),
            zone: self.zone.clone(),
            started_on: self.started_on,
        }
    }
}

/// Changed subset of [`TaskAttributes`]; `None` leaves the task field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub status: Option<String>,
    pub state: Option<String>,
    pub message: Option<String>,
    pub userid: Option<Option<String>>,
    pub miq_server_id: Option<Option<u64>>,
    pub context_data: Option<Option<String>>,
    pub zone: Option<Option<String>>,
    pub started_on: Option<Option<DateTime<Utc>>>,
}

fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
    (old != new).then(|| new.clone())
}

impl TaskPatch {
    /// Fields that differ between `old` and `new`.
    pub fn diff(old: &TaskAttributes, new: &TaskAttributes) -> Self {
        Self {
            name: changed(&old.name, &new.name),
            status: changed(&old.status, &new.status),
            state: changed(&old.state, &new.state),
            message: changed(&old.message, &new.message),
            userid: changed(&old.userid, &new.userid),
            miq_server_id: changed(&old.miq_server_id, &new.miq_server_id),
            context_data: changed(&old.context_data, &new.context_data),
            zone: changed(&old.zone, &new.zone),
            started_on: changed(&old.started_on, &new.started_on),
        }
    }

    /// Every field set; used to seed a task from a job.
    pub fn full(attributes: &TaskAttributes) -> Self {
        Self {
            name: Some(attributes.name.clone()),
            status: Some(attributes.status.clone()),
            state: Some(attributes.state.clone()),
            message: Some(attributes.message.clone()),
            userid: Some(attributes.userid.clone()),
            miq_server_id: Some(attributes.miq_server_id),
            context_data: Some(attributes.context_data.clone()),
            zone: Some(attributes.zone.clone()),
            started_on: Some(attributes.started_on),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Names of the fields this patch writes, for logs.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let flags = [
            ("name", self.name.is_some()),
            ("status", self.status.is_some()),
            ("state", self.state.is_some()),
            ("message", self.message.is_some()),
            ("userid", self.userid.is_some()),
            ("miq_server_id", self.miq_server_id.is_some()),
            ("context_data", self.context_data.is_some()),
            ("zone", self.zone.is_some()),
            ("started_on", self.started_on.is_some()),
        ];
        for (name, set) in flags {
            if set {
                names.push(name);
            }
        }
        names
    }

    /// Write the set fields onto `task`.
    pub fn apply(&self, task: &mut TaskRecord) {
        if let Some(name) = &self.name {
            task.name.clone_from(name);
        }
        if let Some(status) = &self.status {
            task.status.clone_from(status);
        }
        if let Some(state) = &self.state {
            task.state.clone_from(state);
        }
        if let Some(message) = &self.message {
            task.message.clone_from(message);
        }
        if let Some(userid) = &self.userid {
            task.userid.clone_from(userid);
        }
        if let Some(miq_server_id) = self.miq_server_id {
            task.miq_server_id = miq_server_id;
        }
        if let Some(context_data) = &self.context_data {
            task.context_data.clone_from(context_data);
        }
        if let Some(zone) = &self.zone {
            task.zone.clone_from(zone);
        }
        if let Some(started_on) = self.started_on {
            task.started_on = started_on;
        }
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/task_attributes.rs"]
mod tests;
