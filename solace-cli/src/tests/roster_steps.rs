//! Behaviour-driven step definitions for roster import and feedback.

use super::helpers::{Workspace, output_json};
use super::*;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use solace_core::{
    Category, Feedback, RecommendationItem, RecommendationStore, TherapistDirectory,
    builtin_fallback,
};
use std::cell::RefCell;

const ROSTER: &str = r#"[
  {"id": "t-1", "full_name": "Dr. Maya Chen", "credentials": "PsyD", "verified": true,
   "specializations": ["anxiety", "trauma"], "latitude": 37.7750, "longitude": -122.4183},
  {"id": "t-2", "full_name": "Sam Ortiz", "credentials": "LMFT", "verified": true,
   "is_accepting_clients": false, "latitude": 37.8044, "longitude": -122.2712}
]"#;

#[derive(Debug)]
struct RosterWorld {
    workspace: Workspace,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RosterWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn run(&self, args: &[String]) {
        let mut argv = vec!["solace".to_owned()];
        argv.extend(args.iter().cloned());
        argv.extend([format!("--{ARG_DATABASE}"), self.workspace.database().to_string()]);

        let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| {
            let mut buffer = self.stdout.borrow_mut();
            match cli.command {
                Command::ImportTherapists(args) => import::run_import(args, &mut *buffer),
                Command::Feedback(args) => feedback::run_feedback(args, &mut *buffer),
                other => panic!("expected import or feedback command, found {other:?}"),
            }
        });
        self.result.replace(Some(outcome));
    }

    fn first_recommendation_id(&self, user: &str) -> i64 {
        self.workspace
            .store()
            .recommendations_for(user)
            .expect("read recommendations")
            .first()
            .map(|row| row.id)
            .expect("user should have recommendations")
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }

    fn output(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        if let Some(Err(err)) = borrowed.as_ref() {
            panic!("expected success, found {err:?}");
        }
        output_json(&self.stdout.borrow())
    }
}

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

#[fixture]
fn world() -> RosterWorld {
    RosterWorld::new()
}

#[given("a roster file with 2 therapists")]
fn roster_file(#[from(world)] world: &RosterWorld) {
    world.workspace.write("roster.json", ROSTER);
}

#[given("a roster file containing invalid JSON")]
fn malformed_roster_file(#[from(world)] world: &RosterWorld) {
    world.workspace.write("roster.json", "[{ \"id\": ");
}

#[given("{user} has stored recommendations")]
fn user_has_recommendations(#[from(world)] world: &RosterWorld, user: String) {
    let items: Vec<RecommendationItem> = Category::REQUIRED
        .into_iter()
        .map(|category| builtin_fallback(category).into_item(category))
        .collect();
    world
        .workspace
        .store()
        .replace_for_user(unquote(&user), &items)
        .expect("seed recommendations");
}

#[when("I import the roster")]
fn import_roster(#[from(world)] world: &RosterWorld) {
    let roster = world.workspace.path("roster.json");
    world.run(&["import-therapists".to_owned(), roster.to_string()]);
}

#[when("{user} marks their first recommendation as {value}")]
fn mark_own_recommendation(#[from(world)] world: &RosterWorld, user: String, value: String) {
    let id = world.first_recommendation_id(unquote(&user));
    world.run(&feedback_args(unquote(&user), id, unquote(&value)));
}

#[when("{user} marks the first recommendation of {owner} as {value}")]
fn mark_foreign_recommendation(
    #[from(world)] world: &RosterWorld,
    user: String,
    owner: String,
    value: String,
) {
    let id = world.first_recommendation_id(unquote(&owner));
    world.run(&feedback_args(unquote(&user), id, unquote(&value)));
}

fn feedback_args(user: &str, id: i64, value: &str) -> Vec<String> {
    vec![
        "feedback".to_owned(),
        format!("--{ARG_USER}"),
        user.to_owned(),
        format!("--{ARG_RECOMMENDATION}"),
        id.to_string(),
        format!("--{ARG_VALUE}"),
        value.to_owned(),
    ]
}

#[then("the command reports {count} imported therapists")]
fn reports_imported(#[from(world)] world: &RosterWorld, count: usize) {
    assert_eq!(world.output()["imported"], count);
}

#[then("the directory lists {count} therapist")]
fn directory_lists(#[from(world)] world: &RosterWorld, count: usize) {
    let candidates = world
        .workspace
        .store()
        .nearby_candidates()
        .expect("read directory");
    assert_eq!(candidates.len(), count);
}

#[then("the command fails because the roster is malformed")]
fn fails_malformed_roster(#[from(world)] world: &RosterWorld) {
    match &*world.error() {
        CliError::ParseInput { field, .. } => assert_eq!(*field, ARG_ROSTER),
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[then("the feedback is acknowledged")]
fn feedback_acknowledged(#[from(world)] world: &RosterWorld) {
    assert_eq!(world.output()["success"], true);
}

#[then("the first recommendation of {user} carries {value} feedback")]
fn recommendation_carries_feedback(#[from(world)] world: &RosterWorld, user: String, value: String) {
    let stored = world
        .workspace
        .store()
        .recommendations_for(unquote(&user))
        .expect("read recommendations");
    let expected: Feedback = unquote(&value).parse().expect("valid feedback");
    assert_eq!(stored.first().and_then(|row| row.user_feedback), Some(expected));
    assert!(stored.iter().skip(1).all(|row| row.user_feedback.is_none()));
}

#[then("the command fails because the recommendation was not found")]
fn fails_not_found(#[from(world)] world: &RosterWorld) {
    match &*world.error() {
        CliError::RecommendationNotFound { user, .. } => assert_eq!(user, "user-2"),
        other => panic!("expected RecommendationNotFound, found {other:?}"),
    }
}

#[then("the command fails because the feedback value is invalid")]
fn fails_invalid_value(#[from(world)] world: &RosterWorld) {
    match &*world.error() {
        CliError::InvalidFeedback(err) => assert_eq!(err.value, "meh"),
        other => panic!("expected InvalidFeedback, found {other:?}"),
    }
}

macro_rules! register_roster_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/roster_and_feedback.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RosterWorld) {
            let _ = world;
        }
    };
}

register_roster_scenario!(import_roster_file, "importing a therapist roster");
register_roster_scenario!(import_malformed_roster, "rejecting a malformed roster");
register_roster_scenario!(feedback_recorded, "recording feedback on a stored recommendation");
register_roster_scenario!(
    feedback_foreign_recommendation,
    "rejecting feedback on another user's recommendation"
);
register_roster_scenario!(feedback_invalid_value, "rejecting an unknown feedback value");
