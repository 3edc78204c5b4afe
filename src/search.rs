//! Client-side search, totals and selection over cached result lists.

use crate::debounce::Debouncer;
use crate::models::{numeric, FlexId, Infraction, PaymentAgreement};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Quiet period before an infraction search is recomputed.
pub const INFRACTION_SEARCH_DELAY: Duration = Duration::from_millis(150);

/// Quiet period before an agreement search is recomputed.
pub const AGREEMENT_SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Text fields a record is matched against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<Cow<'_, str>>;

    /// Case-insensitive substring match; `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

impl Searchable for Infraction {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.type_infraction_name.as_deref().unwrap_or("")),
            Cow::Borrowed(self.observations.as_deref().unwrap_or("")),
            Cow::Borrowed(self.search_user_name().unwrap_or("")),
        ]
    }
}

impl Searchable for PaymentAgreement {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.person_name.as_deref().unwrap_or("")),
            Cow::Owned(self.document_text()),
            Cow::Owned(self.fine_type().unwrap_or_default()),
            Cow::Owned(self.infringement_text().unwrap_or_default()),
            Cow::Owned(self.id.as_text()),
        ]
    }
}

/// Items matching `query`. A blank query returns every item.
pub fn filter<T: Searchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.matches(&needle))
        .cloned()
        .collect()
}

/// Something with a monetary amount and an optional id.
pub trait Priced {
    /// Amount counted in totals; missing or non-numeric is zero.
    fn price(&self) -> f64;

    fn item_id(&self) -> Option<FlexId>;
}

impl Priced for Infraction {
    fn price(&self) -> f64 {
        self.listing_amount()
    }

    fn item_id(&self) -> Option<FlexId> {
        self.id.clone()
    }
}

impl Priced for Value {
    /// First non-null of `value`, `amount` and `total`.
    fn price(&self) -> f64 {
        ["value", "amount", "total"]
            .iter()
            .find_map(|key| self.get(*key).filter(|v| !v.is_null()))
            .map(numeric)
            .unwrap_or(0.0)
    }

    fn item_id(&self) -> Option<FlexId> {
        self.get("id")
            .and_then(|id| serde_json::from_value(id.clone()).ok())
    }
}

/// Count and summed amount of a list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub total: f64,
}

pub fn summarize<T: Priced>(items: &[T]) -> Summary {
    Summary {
        count: items.len(),
        total: items.iter().map(Priced::price).sum(),
    }
}

/// Ids the user has ticked, in the order they were selected.
///
/// The selection is independent of any active search filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<FlexId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` when absent, removes it when present. Returns whether it is
    /// now selected.
    pub fn toggle(&mut self, id: FlexId) -> bool {
        if let Some(pos) = self.ids.iter().position(|x| *x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: &FlexId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[FlexId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Summary of the selected items only.
    pub fn summarize<T: Priced>(&self, items: &[T]) -> Summary {
        let selected: Vec<f64> = items
            .iter()
            .filter(|item| item.item_id().is_some_and(|id| self.contains(&id)))
            .map(Priced::price)
            .collect();
        Summary {
            count: selected.len(),
            total: selected.iter().sum(),
        }
    }
}

/// Debounced search over a fixed list.
///
/// [`LiveSearch::set_query`] records the query and schedules a recomputation;
/// results are published on a watch channel once the input has been quiet for
/// the configured delay.
pub struct LiveSearch<T> {
    items: Arc<Vec<T>>,
    query: Mutex<String>,
    results: Arc<watch::Sender<Arc<Vec<T>>>>,
    recomputations: Arc<AtomicUsize>,
    debouncer: Debouncer,
}

impl<T> LiveSearch<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    pub fn new(items: Vec<T>, delay: Duration) -> Self {
        let items = Arc::new(items);
        let (results, _) = watch::channel(items.clone());
        Self {
            items,
            query: Mutex::new(String::new()),
            results: Arc::new(results),
            recomputations: Arc::new(AtomicUsize::new(0)),
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn query(&self) -> String {
        self.query.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        *self.query.lock().unwrap_or_else(|e| e.into_inner()) = query.clone();

        let items = self.items.clone();
        let results = self.results.clone();
        let recomputations = self.recomputations.clone();
        self.debouncer.schedule(async move {
            let filtered = filter(&items, &query);
            recomputations.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                component = "search",
                "{} of {} items match '{}'",
                filtered.len(),
                items.len(),
                query
            );
            results.send_replace(Arc::new(filtered));
        });
    }

    /// Latest published results.
    pub fn results(&self) -> Arc<Vec<T>> {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.results.subscribe()
    }

    /// Number of times the filter has actually run.
    pub fn recompute_count(&self) -> usize {
        self.recomputations.load(Ordering::SeqCst)
    }
}

impl LiveSearch<Infraction> {
    pub fn for_infractions(items: Vec<Infraction>) -> Self {
        Self::new(items, INFRACTION_SEARCH_DELAY)
    }
}

impl LiveSearch<PaymentAgreement> {
    pub fn for_agreements(items: Vec<PaymentAgreement>) -> Self {
        Self::new(items, AGREEMENT_SEARCH_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn infractions() -> Vec<Infraction> {
        vec![
            serde_json::from_value(json!({
                "id": 1,
                "typeInfractionName": "Parking",
                "observations": "obs A",
                "userName": "userX",
                "value": 1000
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": 2,
                "typeInfractionName": "Speeding",
                "observations": "obs B",
                "user": {"userName": "userY"},
                "amount": 2000.0
            }))
            .unwrap(),
        ]
    }

    #[test]
    fn test_filter_by_type_any_case() {
        let items = infractions();
        let found = filter(&items, "SPEED");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(FlexId::Int(2)));
        assert_eq!(filter(&items, "").len(), 2);
        assert_eq!(filter(&items, "   ").len(), 2);
        assert!(filter(&items, "zzz").is_empty());
    }

    #[test]
    fn test_filter_uses_nested_user_name() {
        let items = infractions();
        assert_eq!(filter(&items, "usery").len(), 1);
        assert_eq!(filter(&items, "  obs ").len(), 2);
    }

    #[test]
    fn test_filter_agreements() {
        let agreements: Vec<PaymentAgreement> = serde_json::from_value(json!([
            {"id": 11, "personName": "Ana Gomez", "documentNumber": "1020", "typeFine": "C29"},
            {"id": "AC-2", "personName": "Luis", "document": 555, "infringement": "Semaforo"}
        ]))
        .unwrap();
        assert_eq!(filter(&agreements, "ana").len(), 1);
        assert_eq!(filter(&agreements, "555").len(), 1);
        assert_eq!(filter(&agreements, "ac-2").len(), 1);
        assert_eq!(filter(&agreements, "semaf").len(), 1);
        assert_eq!(filter(&agreements, "c29").len(), 1);
    }

    #[test]
    fn test_filter_agreements_by_numeric_fine_type() {
        let agreements: Vec<PaymentAgreement> =
            serde_json::from_value(json!([{"id": 1, "typeFine": 3}, {"id": 2}])).unwrap();
        assert_eq!(filter(&agreements, "3").len(), 1);
    }

    #[test]
    fn test_summarize_values() {
        let items = vec![json!({"value": 1000}), json!({"amount": 2000}), json!({})];
        assert_eq!(summarize(&items), Summary { count: 3, total: 3000.0 });
    }

    #[test]
    fn test_summarize_non_numeric_counts_zero() {
        let items = vec![
            json!({"value": "abc", "amount": 50}),
            json!({"value": null, "amount": "25"}),
            json!({"total": 10}),
        ];
        assert_eq!(summarize(&items), Summary { count: 3, total: 35.0 });
        assert_eq!(summarize::<Value>(&[]), Summary::default());
    }

    #[test]
    fn test_summarize_infractions() {
        assert_eq!(summarize(&infractions()).total, 3000.0);
    }

    #[test]
    fn test_selection_toggle_and_total() {
        let items = infractions();
        let mut selection = Selection::new();
        assert!(selection.toggle(FlexId::Int(2)));
        assert_eq!(selection.summarize(&items), Summary { count: 1, total: 2000.0 });

        assert!(selection.toggle(FlexId::Int(1)));
        assert_eq!(selection.summarize(&items).total, 3000.0);

        assert!(!selection.toggle(FlexId::Int(2)));
        assert_eq!(selection.ids(), &[FlexId::Int(1)]);
        assert_eq!(selection.summarize(&items).total, 1000.0);
    }

    #[test]
    fn test_selection_survives_filtering() {
        let items = infractions();
        let mut selection = Selection::new();
        selection.toggle(FlexId::Int(1));
        let visible = filter(&items, "speed");
        assert_eq!(selection.summarize(&visible).count, 0);
        assert!(selection.contains(&FlexId::Int(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_search_debounces_keystrokes() {
        let search = LiveSearch::for_infractions(infractions());
        assert_eq!(search.results().len(), 2);

        for prefix in ["s", "sp", "spe", "spee", "speed"] {
            search.set_query(prefix);
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        assert_eq!(search.recompute_count(), 0);
        assert_eq!(search.results().len(), 2);

        tokio::time::sleep(INFRACTION_SEARCH_DELAY).await;
        assert_eq!(search.recompute_count(), 1);
        assert_eq!(search.results().len(), 1);
        assert_eq!(search.query(), "speed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_search_notifies_subscribers() {
        let search = LiveSearch::new(infractions(), Duration::from_millis(300));
        let mut rx = search.subscribe();

        search.set_query("parking");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 1);

        search.set_query("");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 2);
        assert_eq!(search.recompute_count(), 2);
    }
}
