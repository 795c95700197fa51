//! Behaviour-driven step definitions driving the solve and dispatch commands.

use super::helpers::{SolverBehaviour, StubBackend, write_utf8};
use super::*;
use crate::dispatch::run_dispatch_with;
use crate::solve::run_solve_with;
use crate::visualize::run_visualize_with;
use aquaroute_core::test_support::sample_problem;
use aquaroute_core::{
    AssignmentViolation, DispatchError, DispatchOutcome, Route, SolveResult, Stage,
    VisualizationResult, VisualizeProblem,
};
use camino::Utf8PathBuf;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct CommandWorld {
    _tmp: TempDir,
    root: Utf8PathBuf,
    request_path: Utf8PathBuf,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    backend: RefCell<StubBackend>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CommandWorld {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let request_path = root.join("request.json");

        Self {
            _tmp: tmp,
            root,
            request_path,
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            backend: RefCell::new(StubBackend::default()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn output_path(&self) -> Utf8PathBuf {
        self.root.join("out/dispatch.json")
    }

    fn build_command_line(&self, subcommand: &str) -> Vec<String> {
        let mut argv = vec!["aquaroute".to_owned(), subcommand.to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn run(&self, subcommand: &str) {
        let invocation = self.build_command_line(subcommand);
        let backend = self.backend.borrow().clone();
        let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
        let outcome = parsed.and_then(|cli| {
            let mut buffer = self.stdout.borrow_mut();
            match cli.command {
                Command::Solve(args) => run_solve_with(args, &backend, &mut *buffer),
                Command::Dispatch(args) => run_dispatch_with(args, &backend, &mut *buffer),
                Command::Visualize(args) => run_visualize_with(args, &backend, &mut *buffer),
            }
        });
        self.result.replace(Some(outcome));
    }

    fn expect_error<T>(&self, check: impl FnOnce(&CliError) -> T) -> T {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        check(error)
    }
}

#[fixture]
fn world() -> CommandWorld {
    CommandWorld::new()
}

#[given("a valid routing request exists on disk")]
fn valid_request_exists(#[from(world)] world: &CommandWorld) {
    let payload = serde_json::to_string_pretty(&sample_problem()).expect("serialize request");
    write_utf8(&world.request_path, payload.as_bytes());
}

#[given("a visualization request exists on disk")]
fn visualization_request_exists(#[from(world)] world: &CommandWorld) {
    let problem = sample_problem();
    let request = VisualizeProblem {
        couriers: problem.couriers,
        orders: problem.orders,
        routes: vec![Route::new("courier1", ["order3", "order4"])],
        common_depot: problem.common_depot,
    };
    let payload = serde_json::to_string_pretty(&request).expect("serialize request");
    write_utf8(&world.request_path, payload.as_bytes());
}

#[given("the routing request contains invalid JSON")]
fn request_contains_invalid_json(#[from(world)] world: &CommandWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[given("the routing request has no couriers")]
fn request_has_no_couriers(#[from(world)] world: &CommandWorld) {
    write_utf8(
        &world.request_path,
        br#"{"couriers": [], "orders": [{"id": "order1", "lat": 43.2, "lon": 76.9}]}"#,
    );
}

#[given("I omit the request path")]
fn omit_request_path(#[from(world)] world: &CommandWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("I request verification")]
fn request_verification(#[from(world)] world: &CommandWorld) {
    world.cli_args.borrow_mut().push(format!("--{ARG_VERIFY}"));
}

#[given("I request output to a file")]
fn request_output_file(#[from(world)] world: &CommandWorld) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_OUTPUT}"),
        world.output_path().as_str().to_owned(),
    ]);
}

#[given("the solver leaves an order unassigned")]
fn solver_leaves_order_unassigned(#[from(world)] world: &CommandWorld) {
    let partial = SolveResult::new(vec![Route::new(
        "courier2",
        ["order1", "order2", "order3"],
    )]);
    world.backend.borrow_mut().solver = SolverBehaviour::Returning(partial);
}

#[given("the solver exits with an error")]
fn solver_exits_with_error(#[from(world)] world: &CommandWorld) {
    world.backend.borrow_mut().solver = SolverBehaviour::Failing("Solver status: INFEASIBLE");
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &CommandWorld) {
    world.run("solve");
}

#[when("I run the dispatch command")]
fn run_dispatch_command(#[from(world)] world: &CommandWorld) {
    world.run("dispatch");
}

#[then("the command succeeds and prints routes covering every order")]
fn command_prints_routes(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let response: SolveResult =
        serde_json::from_str(&stdout).expect("output should be a JSON solve result");
    assert_eq!(
        response.assigned_orders().count(),
        sample_problem().orders.len()
    );
}

#[then("the command prints the visualizer message")]
fn command_prints_visualizer_message(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let result: VisualizationResult =
        serde_json::from_str(&stdout).expect("output should be a visualization result");
    match result {
        VisualizationResult::Fallback { success, message, .. } => {
            assert!(success);
            assert_eq!(message, "Visualization saved");
        }
        other => panic!("expected fallback result, found {other:?}"),
    }
}

#[when("I run the visualize command")]
fn run_visualize_command(#[from(world)] world: &CommandWorld) {
    world.run("visualize");
}

#[then("the output file holds the routes and the visualization")]
fn output_file_holds_outcome(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");

    let written = std::fs::read_to_string(world.output_path()).expect("output file written");
    let outcome: DispatchOutcome =
        serde_json::from_str(&written).expect("output should be a dispatch outcome");
    assert!(!outcome.vrp_result.routes.is_empty());
    assert!(outcome.visualization.is_success());
}

#[then("nothing is printed")]
fn nothing_printed(#[from(world)] world: &CommandWorld) {
    assert!(world.stdout.borrow().is_empty());
}

#[then("the command fails because verification rejected the answer")]
fn command_fails_verification(#[from(world)] world: &CommandWorld) {
    world.expect_error(|error| match error {
        CliError::Verification(AssignmentViolation::UnservedOrder { order_id }) => {
            assert_eq!(order_id, "order4");
        }
        other => panic!("expected Verification, found {other:?}"),
    });
    assert!(world.stdout.borrow().is_empty());
}

#[then("the command fails because the request JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &CommandWorld) {
    world.expect_error(|error| match error {
        CliError::ParseRequest { path, .. } => assert_eq!(*path, world.request_path),
        other => panic!("expected ParseRequest, found {other:?}"),
    });
}

#[then("the command fails because the request is invalid")]
fn command_fails_invalid_request(#[from(world)] world: &CommandWorld) {
    world.expect_error(|error| match error {
        CliError::InvalidRequest { .. } => {}
        other => panic!("expected InvalidRequest, found {other:?}"),
    });
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &CommandWorld) {
    world.expect_error(|error| match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_REQUEST);
            assert_eq!(*env, ENV_SOLVE_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

#[then("the command fails at the solver step")]
fn command_fails_at_solver(#[from(world)] world: &CommandWorld) {
    world.expect_error(|error| match error {
        CliError::Dispatch(DispatchError::Pipeline {
            stage: Stage::Solve,
            source,
        }) => assert!(source.to_string().contains("INFEASIBLE")),
        other => panic!("expected solver pipeline failure, found {other:?}"),
    });
    assert!(world.stdout.borrow().is_empty());
}

macro_rules! register_command_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/cli_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_command_scenario!(solve_happy_path, "solving a request from JSON");
register_command_scenario!(solve_verified, "verifying a complete assignment");
register_command_scenario!(solve_incomplete, "rejecting an incomplete assignment");
register_command_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_command_scenario!(solve_invalid_request, "rejecting requests without couriers");
register_command_scenario!(solve_missing_request, "rejecting missing request paths");
register_command_scenario!(dispatch_to_file, "dispatching to an output file");
register_command_scenario!(dispatch_solver_failure, "dispatch stops when the solver fails");
register_command_scenario!(visualize_routes, "rendering pre-computed routes");
