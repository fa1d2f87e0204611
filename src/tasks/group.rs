//! # Named task groups.
//!
//! A [`Group`] collects [`TaskSpec`]s under a name, purely for modularity —
//! think of it as a router: one module builds the "emails" group, another the
//! "billing" group, and the application includes both. Groups add no runtime
//! semantics; their tasks run exactly like directly registered ones.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use chime::{Clock, Config, Group, JobFn, TaskContext, TaskError, TaskSpec, Trigger};
//!
//! let mut emails = Group::new("emails");
//! emails.task(TaskSpec::new(
//!     JobFn::arc("send-digest", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
//!     Trigger::every(Duration::from_secs(3600)),
//! ));
//!
//! let mut app = Clock::new(Config::default());
//! app.include_group(emails);
//! ```

use std::sync::Arc;

use crate::tasks::TaskSpec;

/// Named, purely organizational collection of task specifications.
pub struct Group {
    name: Arc<str>,
    specs: Vec<TaskSpec>,
}

impl Group {
    /// Creates an empty group.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            specs: Vec::new(),
        }
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a task specification to the group.
    pub fn task(&mut self, spec: TaskSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// Number of specifications in the group.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// True if the group holds no specifications.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Arc<str>, Vec<TaskSpec>) {
        (self.name, self.specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::{JobFn, TaskContext};
    use crate::triggers::Trigger;

    #[test]
    fn collects_specs_in_order() {
        let mut group = Group::new("emails");
        assert!(group.is_empty());

        group.task(TaskSpec::new(
            JobFn::arc("first", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));
        group.task(TaskSpec::new(
            JobFn::arc("second", |_ctx: TaskContext| async { Ok::<(), TaskError>(()) }),
            Trigger::once(),
        ));

        assert_eq!(group.len(), 2);
        let (name, specs) = group.into_parts();
        assert_eq!(&*name, "emails");
        assert_eq!(specs[0].name(), "first");
        assert_eq!(specs[1].name(), "second");
    }
}
