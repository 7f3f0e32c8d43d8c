//! Refresh execution and ordering state

use super::plan::{plan_refresh, PaintJob, RefreshClass, RefreshPlan};
use crate::traits::{Color, DisplayError, PaperDisplay, Rect};

/// What a refresh actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RefreshOutcome {
    pub class: RefreshClass,
    /// A full blank pass ran first
    pub blank_sub_pass: bool,
}

/// Tracks the full-before-partial rule for one boot session
#[derive(Debug, Clone, Default)]
pub struct RefreshTracker {
    needs_full_clear_before_partial: bool,
}

/// Run one bracketed paint pass
fn run_pass<D, F>(
    display: &mut D,
    class: RefreshClass,
    target: Rect,
    paint: &mut F,
) -> Result<(), DisplayError>
where
    D: PaperDisplay + ?Sized,
    F: FnMut(&mut D),
{
    match class {
        RefreshClass::Full => display.set_full_window(),
        RefreshClass::Partial => display.set_partial_window(target),
    }
    display.first_page();
    loop {
        display.fill_rect(target, Color::White);
        paint(display);
        if !display.next_page()? {
            break;
        }
    }
    Ok(())
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn needs_full_clear_before_partial(&self) -> bool {
        self.needs_full_clear_before_partial
    }

    /// Plan `job` against the current ordering state
    pub fn plan(&self, job: PaintJob, panel: Rect) -> RefreshPlan {
        plan_refresh(job, panel, self.needs_full_clear_before_partial)
    }

    /// Execute a plan
    ///
    /// A partial plan that arrives while the flag is set first gets a
    /// synchronous full blank pass, which clears the flag. A full plan sets
    /// the flag for the next cycle, even if the driver reported an error.
    pub fn execute<D, F>(
        &mut self,
        display: &mut D,
        plan: &RefreshPlan,
        mut paint: F,
    ) -> Result<RefreshOutcome, DisplayError>
    where
        D: PaperDisplay + ?Sized,
        F: FnMut(&mut D),
    {
        let mut blank_sub_pass = false;
        if plan.class == RefreshClass::Partial && self.needs_full_clear_before_partial {
            debug!("Full blank pass before partial refresh");
            let panel = display.bounds();
            run_pass(display, RefreshClass::Full, panel, &mut |_: &mut D| {})?;
            self.needs_full_clear_before_partial = false;
            blank_sub_pass = true;
        }

        let result = run_pass(display, plan.class, plan.target, &mut paint);
        if plan.class == RefreshClass::Full {
            self.needs_full_clear_before_partial = true;
        }
        result?;

        debug!(
            "Refresh done: {} window={} sub_pass={}",
            plan.class,
            plan.target,
            blank_sub_pass
        );
        Ok(RefreshOutcome {
            class: plan.class,
            blank_sub_pass,
        })
    }
}
