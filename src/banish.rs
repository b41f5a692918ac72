//! Paginated fetch, delete and deactivate loop
//!
//! The list endpoints are positional (`?page=n`) and shrink while nodes are
//! deleted, so advancing the page number after deleting skips items. Three
//! walks are available:
//!
//! - `Snapshot` reads every page first without touching anything, then
//!   deletes each collected node once
//! - `Interleaved` deletes page by page while advancing, like the legacy
//!   tooling did (it can miss items)
//! - `Rescan` keeps reading page 1 until nothing new shows up, then moves
//!   past pages left full of items whose delete failed
//!
//! Deactivation runs once, after every target was walked without error.

use crate::{
    api::{
        ActionItem, MutationOutcome, Page, PageItem, QuestionItem, Transport, deactivate_user,
        decode, delete_node, update_question_body,
    },
    error::{Error, Result},
    report::{Deactivation, Report, TargetReport},
};
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::{debug, error, info, warn};

pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// Collection of the user to walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Actions,
    Questions,
}

impl Target {
    /// Resource path of a page of this collection
    #[must_use]
    pub fn path(self, user_id: u64, page: u32) -> String {
        match self {
            Self::Actions => format!("user/{user_id}/action.json?page={page}"),
            Self::Questions => format!("user/{user_id}/question.json?page={page}"),
        }
    }

    /// Actions stop on `pageCount`, questions on `totalCount`
    #[must_use]
    pub const fn default_termination(self) -> Termination {
        match self {
            Self::Actions => Termination::PageCount,
            Self::Questions => Termination::TotalCount,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actions => write!(f, "actions"),
            Self::Questions => write!(f, "questions"),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "actions" | "action" => Ok(Self::Actions),
            "questions" | "question" => Ok(Self::Questions),
            _ => Err(format!("Invalid target: {s}")),
        }
    }
}

/// Rule deciding whether another page follows the one just read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    /// Continue while `pageCount > page`
    PageCount,
    /// Continue while `totalCount > listCount`
    TotalCount,
}

impl Termination {
    /// Evaluated after `page` (numbered `page_number`) was processed.
    ///
    /// A zero count with items in the list means the server left the field
    /// out, the walk goes on until an empty page shows up.
    #[must_use]
    pub fn has_more<T>(self, page: &Page<T>, page_number: u32) -> bool {
        match self {
            Self::PageCount if page.page_count == 0 => !page.is_empty(),
            Self::PageCount => page.page_count > page_number,
            Self::TotalCount if page.total_count == 0 => !page.is_empty(),
            Self::TotalCount => page.total_count > page.list_count,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PageCount => write!(f, "page-count"),
            Self::TotalCount => write!(f, "total-count"),
        }
    }
}

impl FromStr for Termination {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "page-count" => Ok(Self::PageCount),
            "total-count" => Ok(Self::TotalCount),
            _ => Err(format!("Invalid termination rule: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Read all pages, then delete every collected node once
    #[default]
    Snapshot,
    /// Delete each page before reading the next one
    Interleaved,
    /// Delete page 1 and read it again until nothing new is left
    Rescan,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => write!(f, "snapshot"),
            Self::Interleaved => write!(f, "interleaved"),
            Self::Rescan => write!(f, "rescan"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snapshot" => Ok(Self::Snapshot),
            "interleaved" => Ok(Self::Interleaved),
            "rescan" => Ok(Self::Rescan),
            _ => Err(format!("Invalid strategy: {s}")),
        }
    }
}

/// What to do when a mutation answers with a non-2xx status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnFailure {
    /// Log, record in the report and go on with the next item
    #[default]
    Continue,
    /// Stop the run, the account is not deactivated
    Abort,
}

/// A collection to walk and the rule used to stop walking it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enumeration {
    pub target: Target,
    pub termination: Termination,
}

impl Enumeration {
    #[must_use]
    pub const fn new(target: Target) -> Self {
        Self {
            target,
            termination: target.default_termination(),
        }
    }

    #[must_use]
    pub const fn until(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub strategy: Strategy,
    pub on_failure: OnFailure,
    pub dry_run: bool,
    /// Overwrite question bodies before deleting them
    pub scrub: bool,
    pub keep_account: bool,
    pub max_pages: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            on_failure: OnFailure::default(),
            dry_run: false,
            scrub: false,
            keep_account: false,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Everything a run needs besides the transport and the user
#[derive(Debug, Clone)]
pub struct Plan {
    pub enumerations: Vec<Enumeration>,
    pub options: Options,
}

impl Plan {
    #[must_use]
    pub fn new(targets: &[Target], options: Options) -> Self {
        Self {
            enumerations: targets.iter().copied().map(Enumeration::new).collect(),
            options,
        }
    }
}

/// Remove the content of `user_id` as described by `plan`, then deactivate
/// the account.
///
/// Use [`Banisher::run`] directly to keep the partial report of an aborted
/// run.
///
/// # Errors
///
/// Returns the first transport or decode error, or a mutation error when
/// `OnFailure::Abort` is set. The account is never deactivated in that case.
pub async fn banish<T: Transport>(transport: &T, user_id: u64, plan: &Plan) -> Result<Report> {
    let mut banisher = Banisher::new(transport, user_id, plan.options.clone());
    banisher.run(&plan.enumerations).await?;

    Ok(banisher.finish())
}

/// Per target bookkeeping while walking pages
struct Progress {
    enumeration: Enumeration,
    stats: TargetReport,
    seen_items: HashSet<u64>,
    nodes: HashSet<u64>,
}

enum Seen {
    /// Item (or its node) already handled
    Repeat,
    /// New item without anything to delete
    NoTarget,
    Node(u64),
}

impl Progress {
    fn new(enumeration: Enumeration) -> Self {
        Self {
            enumeration,
            stats: TargetReport::new(enumeration.target, enumeration.termination),
            seen_items: HashSet::new(),
            nodes: HashSet::new(),
        }
    }

    const fn target(&self) -> Target {
        self.enumeration.target
    }

    fn observe<I: PageItem>(&mut self, item: &I) -> Seen {
        let id = item.id();
        if id != 0 && !self.seen_items.insert(id) {
            return Seen::Repeat;
        }
        self.stats.items_seen += 1;

        match item.target_node() {
            None => {
                self.stats.skipped += 1;
                Seen::NoTarget
            }
            Some(node) if self.nodes.insert(node) => {
                self.stats.unique_nodes += 1;
                Seen::Node(node)
            }
            Some(_) => Seen::Repeat,
        }
    }
}

/// Walks the collections of one user and applies the mutations
pub struct Banisher<'a, T> {
    transport: &'a T,
    user_id: u64,
    options: Options,
    report: Report,
}

impl<'a, T: Transport> Banisher<'a, T> {
    #[must_use]
    pub fn new(transport: &'a T, user_id: u64, options: Options) -> Self {
        let report = Report::new(user_id, options.strategy, options.dry_run);
        Self {
            transport,
            user_id,
            options,
            report,
        }
    }

    #[must_use]
    pub const fn report(&self) -> &Report {
        &self.report
    }

    /// Walk every enumeration in order, then deactivate the account.
    ///
    /// On error the report keeps the progress made so far and the reason.
    ///
    /// # Errors
    ///
    /// Same as [`banish`]
    pub async fn run(&mut self, enumerations: &[Enumeration]) -> Result<()> {
        let result = self.purge_then_deactivate(enumerations).await;

        if let Err(err) = &result {
            error!("aborting, user {} left active: {err}", self.user_id);
            self.report.abort(err);
        }

        result
    }

    async fn purge_then_deactivate(&mut self, enumerations: &[Enumeration]) -> Result<()> {
        for enumeration in enumerations {
            self.purge(*enumeration).await?;
        }

        self.deactivate().await
    }

    /// Walk one collection and delete what it references
    ///
    /// # Errors
    ///
    /// Returns transport and decode errors, and mutation errors in abort mode
    pub async fn purge(&mut self, enumeration: Enumeration) -> Result<()> {
        info!(
            "walking {} of user {} ({}, until {})",
            enumeration.target, self.user_id, self.options.strategy, enumeration.termination
        );

        let mut progress = Progress::new(enumeration);
        let result = match enumeration.target {
            Target::Actions => self.walk::<ActionItem>(&mut progress).await,
            Target::Questions => self.walk::<QuestionItem>(&mut progress).await,
        };

        info!(
            "{}: {} pages, {} items, {} deleted, {} failed",
            enumeration.target,
            progress.stats.pages_fetched,
            progress.stats.items_seen,
            progress.stats.deleted,
            progress.stats.failed
        );
        self.report.targets.push(progress.stats);

        result
    }

    async fn walk<I: PageItem + DeserializeOwned>(&mut self, progress: &mut Progress) -> Result<()> {
        match self.options.strategy {
            Strategy::Snapshot => self.snapshot::<I>(progress).await,
            Strategy::Interleaved => self.interleaved::<I>(progress, false).await,
            Strategy::Rescan => self.interleaved::<I>(progress, true).await,
        }
    }

    async fn snapshot<I: PageItem + DeserializeOwned>(
        &mut self,
        progress: &mut Progress,
    ) -> Result<()> {
        let mut queue = Vec::new();
        let mut page_number = 0;

        while self.within_budget(progress) {
            page_number += 1;
            let page = self.fetch::<I>(progress, page_number).await?;
            let more = progress.enumeration.termination.has_more(&page, page_number);

            let mut fresh = false;
            for item in &page.list {
                match progress.observe(item) {
                    Seen::Node(node) => {
                        queue.push(node);
                        fresh = true;
                    }
                    Seen::NoTarget => fresh = true,
                    Seen::Repeat => {}
                }
            }

            if page.is_empty() || !fresh || !more {
                break;
            }
        }

        info!(
            "collected {} nodes of {} in {} pages",
            queue.len(),
            progress.target(),
            progress.stats.pages_fetched
        );

        for node in queue {
            self.remove(progress, node).await?;
        }

        Ok(())
    }

    /// Delete while reading. With `anchored` the same page is read again
    /// after its deletes and the page number only advances once a page holds
    /// nothing new (items whose delete failed), otherwise it advances every
    /// time.
    async fn interleaved<I: PageItem + DeserializeOwned>(
        &mut self,
        progress: &mut Progress,
        anchored: bool,
    ) -> Result<()> {
        let mut page_number = 1;

        while self.within_budget(progress) {
            let page = self.fetch::<I>(progress, page_number).await?;
            let more = progress.enumeration.termination.has_more(&page, page_number);

            let mut fresh = false;
            for item in &page.list {
                match progress.observe(item) {
                    Seen::Node(node) => {
                        fresh = true;
                        self.remove(progress, node).await?;
                    }
                    Seen::NoTarget => fresh = true,
                    Seen::Repeat => {}
                }
            }

            if page.is_empty() || !more {
                break;
            }

            if fresh {
                if !anchored {
                    page_number += 1;
                }
            } else if anchored {
                debug!(
                    "page {page_number} of {} only holds attempted items, moving on",
                    progress.target()
                );
                page_number += 1;
            } else {
                debug!("page {page_number} of {} holds nothing new", progress.target());
                break;
            }
        }

        Ok(())
    }

    fn within_budget(&self, progress: &Progress) -> bool {
        if progress.stats.pages_fetched < self.options.max_pages {
            true
        } else {
            warn!(
                "{}: stopping after {} pages",
                progress.target(),
                self.options.max_pages
            );
            false
        }
    }

    async fn fetch<I: DeserializeOwned>(
        &self,
        progress: &mut Progress,
        page_number: u32,
    ) -> Result<Page<I>> {
        let target = progress.target();
        let path = target.path(self.user_id, page_number);

        info!("fetching {target} page {page_number} of user {}", self.user_id);
        let response = self.transport.request(Method::GET, &path, None).await?;
        progress.stats.pages_fetched += 1;

        if !response.is_success() {
            return Err(Error::Transport(format!(
                "GET {path} returned status {}: {}",
                response.status,
                response.excerpt()
            )));
        }

        let page: Page<I> = decode(&response.body, &format!("{target} page {page_number}"))?;
        debug!(
            "{target} page {}: pageCount {}, listCount {}, totalCount {}",
            page_number, page.page_count, page.list_count, page.total_count
        );

        Ok(page)
    }

    async fn remove(&mut self, progress: &mut Progress, node: u64) -> Result<()> {
        if self.options.dry_run {
            info!("dry run: would delete node {node}");
            return Ok(());
        }

        if self.options.scrub && progress.target() == Target::Questions {
            let outcome = update_question_body(self.transport, node).await?;
            if self.record(progress, outcome)? {
                progress.stats.scrubbed += 1;
            }
        }

        let outcome = delete_node(self.transport, node).await?;
        if self.record(progress, outcome)? {
            progress.stats.deleted += 1;
        }

        Ok(())
    }

    /// `Ok(true)` on success, `Ok(false)` for a tolerated failure
    fn record(&mut self, progress: &mut Progress, outcome: MutationOutcome) -> Result<bool> {
        if outcome.is_success() {
            return Ok(true);
        }

        progress.stats.failed += 1;
        self.report.failures.push(outcome.clone());

        if self.options.on_failure == OnFailure::Abort {
            outcome.into_result()?;
        }

        Ok(false)
    }

    /// Deactivate the account, at most once per run
    ///
    /// # Errors
    ///
    /// Returns transport errors, and a mutation error in abort mode
    pub async fn deactivate(&mut self) -> Result<()> {
        if self.report.deactivation != Deactivation::Pending {
            return Ok(());
        }

        if self.options.dry_run || self.options.keep_account {
            info!("leaving user {} active", self.user_id);
            self.report.deactivation = Deactivation::Skipped;
            return Ok(());
        }

        let outcome = deactivate_user(self.transport, self.user_id).await?;
        if outcome.is_success() {
            self.report.deactivation = Deactivation::Done;
            return Ok(());
        }

        self.report.deactivation = Deactivation::Failed;
        self.report.failures.push(outcome.clone());

        if self.options.on_failure == OnFailure::Abort {
            outcome.into_result()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn finish(mut self) -> Report {
        self.report.finish();
        self.report
    }
}
