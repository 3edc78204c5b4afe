use crate::api_client::ApiClient;
use crate::civic_code::CivicCode;
use crate::config::Config;
use crate::document_types::DocumentTypeService;
use crate::errors::AppError;
use crate::fines::FinesService;
use crate::infractions::InfractionService;
use crate::payment_agreements::PaymentAgreementService;
use crate::payments::PaymentService;
use crate::session::SessionCache;
use crate::users::UserService;
use std::sync::Arc;

/// Process-wide context.
///
/// Built once at startup and shared by `Arc`. Every service holds a clone of
/// the same `ApiClient`, and the ones that cache share one `SessionCache`.
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionCache>,
    pub document_types: DocumentTypeService,
    pub users: UserService,
    pub infractions: InfractionService,
    pub fines: FinesService,
    pub payments: PaymentService,
    pub payment_agreements: PaymentAgreementService,
    pub civic_code: CivicCode,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let client = ApiClient::from_config(&config)?;
        let session = Arc::new(SessionCache::new());

        let document_types = DocumentTypeService::new(client.clone(), session.clone());
        let users = UserService::new(client.clone());
        let infractions = InfractionService::new(client.clone());
        let fines = FinesService::new(
            document_types.clone(),
            users.clone(),
            infractions.clone(),
            session.clone(),
        );

        tracing::info!(
            api_host = %config.api_host,
            timeout_ms = config.api_timeout.as_millis() as u64,
            "Application state initialized"
        );

        Ok(Arc::new(Self {
            session,
            document_types,
            users,
            infractions,
            fines,
            payments: PaymentService::new(client.clone()),
            payment_agreements: PaymentAgreementService::new(client),
            civic_code: CivicCode::load()?,
            config,
        }))
    }
}
