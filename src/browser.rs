//! A list of records with a derived view that follows the current search.

use std::fmt;

use crate::search::{SearchSpec, Searchable, filter_records};

type Refinement<R> = Box<dyn Fn(&mut Vec<R>) + Send + Sync>;

/// Holds a source list and the view derived from it by a [SearchSpec] and an
/// optional refinement, such as a secondary filter or a sort.
///
/// The view is rebuilt from scratch from the source whenever a refinement is
/// added, so it never drifts from the source.
pub struct RecordBrowser<R> {
    source: Vec<R>,
    spec: SearchSpec,
    refinement: Option<Refinement<R>>,
    view: Vec<R>,
}

impl<R: Searchable + Clone> RecordBrowser<R> {
    /// Create a browser over `source` showing the records that match `spec`.
    pub fn new(source: Vec<R>, spec: SearchSpec) -> Self {
        let mut browser = Self {
            source,
            spec,
            refinement: None,
            view: Vec::new(),
        };
        browser.recompute();

        browser
    }

    /// Apply `refinement` to the view after the search, e.g. to drop records
    /// outside a branch or to sort the matches.
    pub fn with_refinement(
        mut self,
        refinement: impl Fn(&mut Vec<R>) + Send + Sync + 'static,
    ) -> Self {
        self.refinement = Some(Box::new(refinement));
        self.recompute();

        self
    }

    /// Consume the browser and return the records to display.
    pub fn into_view(self) -> Vec<R> {
        self.view
    }

    fn recompute(&mut self) {
        let mut view = filter_records(&self.source, &self.spec);

        if let Some(refinement) = &self.refinement {
            refinement(&mut view);
        }

        self.view = view;
    }
}

impl<R: fmt::Debug> fmt::Debug for RecordBrowser<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordBrowser")
            .field("source", &self.source)
            .field("spec", &self.spec)
            .field("refined", &self.refinement.is_some())
            .field("view", &self.view)
            .finish()
    }
}
