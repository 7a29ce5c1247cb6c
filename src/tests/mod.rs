//! Scenario tests for the wake cycle, run against mock collaborators.
