//! Overlap detection
//!
//! A user may not hold two live passes for the same plate or visitor on the
//! same territory at the same time. The candidate is compared against the
//! user's stored passes; the candidate's own stored version is skipped so a pass
//! can be edited in place.

use crate::passes::{Pass, PassKind, PassStatus};

/// First stored pass that collides with `candidate`, if any.
pub fn find_conflict<'a, I>(candidate: &Pass, existing: I) -> Option<&'a Pass>
where
    I: IntoIterator<Item = &'a Pass>,
{
    existing
        .into_iter()
        .find(|other| conflicts_with(candidate, other))
}

/// Whether any stored pass collides with `candidate`.
pub fn has_conflict<'a, I>(candidate: &Pass, existing: I) -> bool
where
    I: IntoIterator<Item = &'a Pass>,
{
    find_conflict(candidate, existing).is_some()
}

/// Whether `existing` blocks `candidate`.
pub fn conflicts_with(candidate: &Pass, existing: &Pass) -> bool {
    existing.status == PassStatus::Active
        && existing.uuid != candidate.uuid
        && existing.user_uuid == candidate.user_uuid
        && existing.territory_uuid == candidate.territory_uuid
        && same_identifier(&candidate.kind, &existing.kind)
        && candidate.window.overlaps(&existing.window)
}

/// Identifiers only match within the same kind, and an absent identifier
/// matches nothing.
fn same_identifier(a: &PassKind, b: &PassKind) -> bool {
    match (a, b) {
        (PassKind::Vehicle { plate: Some(a) }, PassKind::Vehicle { plate: Some(b) })
        | (
            PassKind::Pedestrian { visitor: Some(a) },
            PassKind::Pedestrian { visitor: Some(b) },
        ) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        fixtures::PassFixture,
        identities::{TerritoryUuid, UserUuid},
        passes::{InvalidWindow, Pass, PassKind, PassStatus},
    };

    use super::*;

    const PLATE: &str = "А420ВХ799";

    #[test]
    fn overlapping_window_for_same_plate_conflicts() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();

        let stored = PassFixture::vehicle(user, territory, PLATE)?.build();
        let candidate = PassFixture::vehicle(user, territory, PLATE)?
            .window_minutes(60, 120)?
            .build();

        let conflict = find_conflict(&candidate, [&stored]);

        assert_eq!(conflict.map(|p| p.uuid), Some(stored.uuid));

        Ok(())
    }

    #[test]
    fn touching_windows_do_not_conflict() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();

        let stored = PassFixture::vehicle(user, territory, PLATE)?.build();
        let candidate = PassFixture::vehicle(user, territory, PLATE)?
            .window_minutes(180, 240)?
            .build();

        assert!(!has_conflict(&candidate, [&stored]));

        Ok(())
    }

    #[test]
    fn pass_does_not_conflict_with_its_stored_self() -> TestResult {
        let stored = PassFixture::vehicle(UserUuid::new(), TerritoryUuid::new(), PLATE)?.build();

        let mut edited = stored.clone();
        edited.window = PassFixture::vehicle(edited.user_uuid, edited.territory_uuid, PLATE)?
            .window_minutes(30, 300)?
            .build()
            .window;

        assert!(!has_conflict(&edited, [&stored]));

        Ok(())
    }

    #[test]
    fn inactive_passes_never_conflict() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();
        let candidate = PassFixture::vehicle(user, territory, PLATE)?.build();

        for status in [
            PassStatus::Cancelled,
            PassStatus::Completed,
            PassStatus::Outdated,
            PassStatus::Warning,
        ] {
            let mut stored = PassFixture::vehicle(user, territory, PLATE)?.build();
            stored.status = status;

            assert!(
                !has_conflict(&candidate, [&stored]),
                "{status} pass should not block a new one"
            );
        }

        Ok(())
    }

    #[test]
    fn different_territory_user_or_identifier_do_not_conflict() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();
        let candidate = PassFixture::vehicle(user, territory, PLATE)?.build();

        let other_territory = PassFixture::vehicle(user, TerritoryUuid::new(), PLATE)?.build();
        let other_user = PassFixture::vehicle(UserUuid::new(), territory, PLATE)?.build();
        let other_plate = PassFixture::vehicle(user, territory, "В777ОР77")?.build();

        assert!(!has_conflict(
            &candidate,
            [&other_territory, &other_user, &other_plate]
        ));

        Ok(())
    }

    #[test]
    fn plate_match_is_case_sensitive() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();

        let stored = PassFixture::vehicle(user, territory, "ab123")?.build();
        let candidate = PassFixture::vehicle(user, territory, "AB123")?.build();

        assert!(!has_conflict(&candidate, [&stored]));

        Ok(())
    }

    #[test]
    fn vehicle_and_pedestrian_passes_never_conflict() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();

        let stored = PassFixture::pedestrian(user, territory, "Ivan Petrov")?.build();
        let candidate = PassFixture::vehicle(user, territory, "Ivan Petrov")?.build();

        assert!(!has_conflict(&candidate, [&stored]));

        Ok(())
    }

    #[test]
    fn absent_identifier_never_conflicts() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();

        let mut stored = PassFixture::pedestrian(user, territory, "anyone")?.build();
        stored.kind = PassKind::Pedestrian { visitor: None };

        let mut candidate = PassFixture::pedestrian(user, territory, "anyone")?.build();
        candidate.kind = PassKind::Pedestrian { visitor: None };

        assert!(!has_conflict(&candidate, [&stored]));

        Ok(())
    }

    #[test]
    fn conflict_detection_is_symmetric_between_active_passes() -> TestResult {
        let user = UserUuid::new();
        let territory = TerritoryUuid::new();
        let windows = [(0, 60), (30, 90), (60, 120), (90, 100), (200, 260)];

        for (a_start, a_end) in windows {
            for (b_start, b_end) in windows {
                let a = visitor_pass(user, territory, a_start, a_end)?;
                let b = visitor_pass(user, territory, b_start, b_end)?;

                assert_eq!(
                    conflicts_with(&a, &b),
                    conflicts_with(&b, &a),
                    "asymmetric conflict for {a_start}..{a_end} and {b_start}..{b_end}"
                );
            }
        }

        Ok(())
    }

    fn visitor_pass(
        user: UserUuid,
        territory: TerritoryUuid,
        start: i64,
        end: i64,
    ) -> Result<Pass, InvalidWindow> {
        Ok(PassFixture::pedestrian(user, territory, "Anna Sidorova")?
            .window_minutes(start, end)?
            .build())
    }
}
