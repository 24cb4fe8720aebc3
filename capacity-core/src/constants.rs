//! Capacity tracker constants

/// Unit assigned to a metric when none is supplied
pub const DEFAULT_METRIC_UNIT: &str = "hours";

/// Id prefix for projects
pub const PROJECT_ID_PREFIX: &str = "project";

/// Id prefix for task groups
pub const TASK_GROUP_ID_PREFIX: &str = "taskgroup";

/// Id prefix for metrics
pub const METRIC_ID_PREFIX: &str = "metric";

/// Id prefix for employees
pub const EMPLOYEE_ID_PREFIX: &str = "emp";

/// Length of the random suffix on task group and metric ids
pub const ID_SUFFIX_LEN: usize = 9;
