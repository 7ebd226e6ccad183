pub mod remove;
pub mod repair;
pub mod show;
pub mod tools;

use metascope_service::{AppliedResult, Finding, RepairPlan};

pub(crate) fn print_findings(findings: &[Finding]) {
    if findings.is_empty() {
        println!("no findings");
        return;
    }
    for finding in findings {
        println!("{finding}");
    }
}

pub(crate) fn print_plan(plan: &RepairPlan) {
    println!("plan: {plan}");
    for mutation in plan.mutations() {
        println!("  {mutation}  [{}]", mutation.entity);
    }
}

pub(crate) fn print_applied(applied: &AppliedResult) {
    if applied.dry_run {
        println!("dry run, nothing written (pass --run to apply)");
        return;
    }
    println!(
        "applied {} of {} mutation(s)",
        applied.succeeded.len(),
        applied.total()
    );
    for failure in &applied.failed {
        println!("  failed {}: {}", failure.mutation, failure.error);
    }
}
