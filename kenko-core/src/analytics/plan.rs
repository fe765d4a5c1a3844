//! Resolves a (metric, grouping) pair to the pieces of the one SQL
//! statement the engine runs: aggregate expression, join path, grouping
//! key, and the column an id filter applies to. The whole combinatorial
//! matrix lives here as data so it can be tested cell by cell.

use super::{GroupBy, Metric};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPlan {
    /// Aggregate expression over the base table's rows.
    pub aggregate: &'static str,
    /// FROM clause joining the base table up (or down) to everything the
    /// grouping and the owner scope need. `ws` is always bound.
    pub from_clause: &'static str,
    /// Column the results are grouped and ordered by; `None` collapses to
    /// a single "Total" row.
    pub group_key: Option<&'static str>,
    /// Column `filter_ids` applies to; `None` means the ids are ignored.
    pub filter_column: Option<&'static str>,
}

// Set-record metrics join upward to the session so the owner and date
// predicates always have `ws` to land on.
const SETS_BASE: &str = concat!(
    "FROM set_records sr",
    " JOIN logged_exercises le ON le.id = sr.logged_exercise_id",
    " JOIN workout_sessions ws ON ws.id = le.session_id",
);

const SETS_TO_EXERCISE: &str = concat!(
    "FROM set_records sr",
    " JOIN logged_exercises le ON le.id = sr.logged_exercise_id",
    " JOIN workout_sessions ws ON ws.id = le.session_id",
    " JOIN exercises e ON e.id = le.exercise_id",
);

const SETS_TO_MUSCLE_GROUP: &str = concat!(
    "FROM set_records sr",
    " JOIN logged_exercises le ON le.id = sr.logged_exercise_id",
    " JOIN workout_sessions ws ON ws.id = le.session_id",
    " JOIN exercises e ON e.id = le.exercise_id",
    " JOIN exercise_muscle_groups em ON em.exercise_id = e.id",
    " JOIN muscle_groups mg ON mg.id = em.muscle_group_id",
);

// FREQUENCY starts from sessions and joins downward only as far as the
// grouping entity. The association fan-out is why it counts DISTINCT
// session ids.
const SESSIONS_BASE: &str = "FROM workout_sessions ws";

const SESSIONS_TO_EXERCISE: &str = concat!(
    "FROM workout_sessions ws",
    " JOIN logged_exercises le ON le.session_id = ws.id",
    " JOIN exercises e ON e.id = le.exercise_id",
);

const SESSIONS_TO_MUSCLE_GROUP: &str = concat!(
    "FROM workout_sessions ws",
    " JOIN logged_exercises le ON le.session_id = ws.id",
    " JOIN exercises e ON e.id = le.exercise_id",
    " JOIN exercise_muscle_groups em ON em.exercise_id = e.id",
    " JOIN muscle_groups mg ON mg.id = em.muscle_group_id",
);

/// Total over every metric/grouping combination; there are no illegal
/// pairs.
pub fn resolve(metric: Metric, group_by: Option<GroupBy>) -> QueryPlan {
    let aggregate = match metric {
        Metric::Volume => "SUM(sr.weight * sr.reps)",
        Metric::MaxWeight => "MAX(sr.weight)",
        Metric::TotalReps => "SUM(sr.reps)",
        Metric::TotalSets => "COUNT(sr.id)",
        Metric::Frequency => "COUNT(DISTINCT ws.id)",
    };

    let from_clause = match (metric, group_by) {
        (Metric::Frequency, Some(GroupBy::MuscleGroup)) => SESSIONS_TO_MUSCLE_GROUP,
        (Metric::Frequency, Some(GroupBy::Exercise)) => SESSIONS_TO_EXERCISE,
        (Metric::Frequency, _) => SESSIONS_BASE,
        (_, Some(GroupBy::MuscleGroup)) => SETS_TO_MUSCLE_GROUP,
        (_, Some(GroupBy::Exercise)) => SETS_TO_EXERCISE,
        (_, _) => SETS_BASE,
    };

    let group_key = group_by.map(|group_by| match group_by {
        GroupBy::MuscleGroup => "mg.name",
        GroupBy::Exercise => "e.name",
        GroupBy::WorkoutTemplate => "ws.name",
        GroupBy::Date => "ws.date",
    });

    let filter_column = match group_by {
        Some(GroupBy::MuscleGroup) => Some("mg.id"),
        Some(GroupBy::Exercise) => Some("e.id"),
        _ => None,
    };

    QueryPlan {
        aggregate,
        from_clause,
        group_key,
        filter_column,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groupings() -> Vec<Option<GroupBy>> {
        let mut all: Vec<Option<GroupBy>> = GroupBy::ALL.into_iter().map(Some).collect();
        all.push(None);
        all
    }

    #[test]
    fn frequency_reads_from_sessions_everything_else_from_sets() {
        for metric in Metric::ALL {
            for group_by in groupings() {
                let plan = resolve(metric, group_by);
                if metric == Metric::Frequency {
                    assert!(plan.from_clause.starts_with("FROM workout_sessions ws"));
                } else {
                    assert!(plan.from_clause.starts_with("FROM set_records sr"));
                }
            }
        }
    }

    #[test]
    fn every_plan_can_scope_to_the_owner() {
        for metric in Metric::ALL {
            for group_by in groupings() {
                let plan = resolve(metric, group_by);
                assert!(
                    plan.from_clause.contains("workout_sessions ws"),
                    "{metric:?}/{group_by:?} cannot reach ws.user_id"
                );
            }
        }
    }

    #[test]
    fn aggregates_match_metric() {
        assert_eq!(
            resolve(Metric::Volume, Some(GroupBy::Exercise)).aggregate,
            "SUM(sr.weight * sr.reps)"
        );
        assert_eq!(
            resolve(Metric::MaxWeight, Some(GroupBy::Date)).aggregate,
            "MAX(sr.weight)"
        );
        assert_eq!(
            resolve(Metric::TotalReps, None).aggregate,
            "SUM(sr.reps)"
        );
        assert_eq!(
            resolve(Metric::TotalSets, Some(GroupBy::MuscleGroup)).aggregate,
            "COUNT(sr.id)"
        );
        assert_eq!(
            resolve(Metric::Frequency, Some(GroupBy::Date)).aggregate,
            "COUNT(DISTINCT ws.id)"
        );
    }

    #[test]
    fn group_keys_follow_the_dimension() {
        for metric in Metric::ALL {
            assert_eq!(
                resolve(metric, Some(GroupBy::MuscleGroup)).group_key,
                Some("mg.name")
            );
            assert_eq!(
                resolve(metric, Some(GroupBy::Exercise)).group_key,
                Some("e.name")
            );
            assert_eq!(
                resolve(metric, Some(GroupBy::WorkoutTemplate)).group_key,
                Some("ws.name")
            );
            assert_eq!(resolve(metric, Some(GroupBy::Date)).group_key, Some("ws.date"));
            assert_eq!(resolve(metric, None).group_key, None);
        }
    }

    #[test]
    fn only_entity_groupings_are_filterable() {
        for metric in Metric::ALL {
            assert_eq!(
                resolve(metric, Some(GroupBy::MuscleGroup)).filter_column,
                Some("mg.id")
            );
            assert_eq!(
                resolve(metric, Some(GroupBy::Exercise)).filter_column,
                Some("e.id")
            );
            assert_eq!(resolve(metric, Some(GroupBy::WorkoutTemplate)).filter_column, None);
            assert_eq!(resolve(metric, Some(GroupBy::Date)).filter_column, None);
            assert_eq!(resolve(metric, None).filter_column, None);
        }
    }

    #[test]
    fn join_paths_stop_at_the_grouping_entity() {
        let plan = resolve(Metric::Frequency, Some(GroupBy::Date));
        assert_eq!(plan.from_clause, "FROM workout_sessions ws");

        let plan = resolve(Metric::Frequency, Some(GroupBy::Exercise));
        assert!(plan.from_clause.contains("exercises e"));
        assert!(!plan.from_clause.contains("muscle_groups"));

        let plan = resolve(Metric::Volume, Some(GroupBy::WorkoutTemplate));
        assert!(!plan.from_clause.contains("exercises e"));

        let plan = resolve(Metric::Volume, Some(GroupBy::MuscleGroup));
        assert!(plan.from_clause.contains("muscle_groups mg"));
    }
}
