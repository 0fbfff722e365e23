// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use aqualink::cli;
use aqualink::commands::{Ctx, feedback, inventory as inventory_cmd};
use aqualink::config::Config;
use aqualink::error::{ApiError, ValidationError};
use aqualink::inventory::{assign_to_tank, low_stock, remaining_after_assign};
use aqualink::session::Session;
use aqualink::validate;
use common::*;

fn stocked() -> FakeBackend {
    let b = FakeBackend::new();
    b.inventory.borrow_mut().extend([item("i1", 20), item("i2", 3), item("i3", 0)]);
    b
}

fn run<F>(b: &FakeBackend, argv: &[&str], handler: F) -> anyhow::Result<()>
where
    F: Fn(&Ctx<'_>, &clap::ArgMatches) -> anyhow::Result<()>,
{
    let conn = conn();
    let config = Config::default();
    let session = Session::anonymous();
    let ctx = Ctx {
        conn: &conn,
        config: &config,
        session: &session,
        backend: b,
        now: now(),
    };
    let m = cli::build_cli().get_matches_from(argv);
    handler(&ctx, m.subcommand().unwrap().1)
}

#[test]
fn assign_reduces_stock() {
    let b = stocked();
    let updated = assign_to_tank(&b, "i1", "T2", 5).unwrap();
    assert_eq!(updated.stock, 15);
    assert_eq!(b.inventory.borrow()[0].stock, 15);
}

#[test]
fn over_assign_is_rejected_without_write() {
    let b = stocked();
    let err = assign_to_tank(&b, "i2", "T1", 4).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::InsufficientStock {
            requested: 4,
            available: 3
        })
    ));
    assert_eq!(b.writes.get(), 0);
    assert_eq!(b.inventory.borrow()[1].stock, 3);
}

#[test]
fn quantity_must_be_positive() {
    let it = item("x", 10);
    assert_eq!(
        remaining_after_assign(&it, 0),
        Err(ValidationError::NonPositiveQuantity(0))
    );
    assert_eq!(remaining_after_assign(&it, 10), Ok(0));
}

#[test]
fn unknown_item_is_not_found() {
    let b = stocked();
    assert!(matches!(
        assign_to_tank(&b, "nope", "T1", 1).unwrap_err(),
        ApiError::NotFound(_)
    ));
}

#[test]
fn low_stock_uses_inclusive_threshold() {
    let items = stocked().inventory.borrow().clone();
    let ids: Vec<&str> = low_stock(&items, 3).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["i2", "i3"]);
}

#[test]
fn assign_command_goes_through_backend() {
    let b = stocked();
    run(
        &b,
        &["aqualink", "inventory", "assign", "--item", "i1", "--qty", "7", "--tank", "T9"],
        inventory_cmd::handle,
    )
    .unwrap();
    assert_eq!(b.inventory.borrow()[0].stock, 13);
}

#[test]
fn feedback_is_validated_before_sending() {
    let b = FakeBackend::new();
    let short = run(
        &b,
        &["aqualink", "feedback", "submit", "--message", "too short", "--rating", "4"],
        feedback::handle,
    );
    assert!(short.is_err());
    let bad_rating = run(
        &b,
        &["aqualink", "feedback", "submit", "--message", "Healthy fish, quick delivery", "--rating", "6"],
        feedback::handle,
    );
    assert!(bad_rating.is_err());
    assert!(b.feedback.borrow().is_empty());

    run(
        &b,
        &["aqualink", "feedback", "submit", "--message", "  Healthy fish, quick delivery  ", "--rating", "5"],
        feedback::handle,
    )
    .unwrap();
    let sent = b.feedback.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message, "Healthy fish, quick delivery");
    assert_eq!(sent[0].rating, 5);
}

#[test]
fn feedback_length_counts_characters() {
    // ten multi-byte characters
    assert!(validate::feedback("ඇඇඇඇඇඇඇඇඇඇ", 3).is_ok());
    assert!(matches!(
        validate::feedback(&"x".repeat(201), 3),
        Err(ValidationError::FeedbackLength { len: 201, .. })
    ));
}
