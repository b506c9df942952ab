use anyhow::Context;
use std::sync::Arc;
use subscriber_dns_domain::{Config, StaticRecordConfig};
use subscriber_dns_infrastructure::dns::{
    QueryMux, RefuseHandler, RegistryResolver, StaticRecordHandler, ROOT,
};
use tracing::{info, warn};

pub struct DnsServices {
    pub mux: Arc<QueryMux>,
    pub static_records: usize,
}

impl DnsServices {
    /// Bind handlers in order: static records, the registry resolver for the
    /// served domain, then the catch-all refusal at the root.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        info!("Initializing DNS handlers");

        let mut mux = QueryMux::new();

        let static_records = Self::register_static_records(&mut mux, &config.static_records);
        Self::register_registry_resolver(&mut mux, config)?;
        mux.register(ROOT, Arc::new(RefuseHandler::new()))?;

        info!(
            static_records,
            domain = %config.domain,
            bindings = mux.len(),
            "DNS handlers ready"
        );

        Ok(Self {
            mux: Arc::new(mux),
            static_records,
        })
    }

    fn register_static_records(mux: &mut QueryMux, records: &[StaticRecordConfig]) -> usize {
        let mut registered = 0;

        for record in records {
            let handler = match StaticRecordHandler::from_config(record) {
                Ok(handler) => handler,
                Err(e) => {
                    warn!(
                        host = %record.host,
                        address = %record.address,
                        error = %e,
                        "Skipping invalid static record"
                    );
                    continue;
                }
            };

            let name = handler.name().to_string();
            info!(record = %handler.record(), "Registering static record");

            match mux.register(&name, Arc::new(handler)) {
                Ok(()) => registered += 1,
                Err(e) => warn!(name = %name, error = %e, "Failed to register static record"),
            }
        }

        registered
    }

    fn register_registry_resolver(mux: &mut QueryMux, config: &Config) -> anyhow::Result<()> {
        let resolver = RegistryResolver::new(&config.registry, &config.site)
            .context("Failed to create registry resolver")?;

        mux.register(&config.domain, Arc::new(resolver))?;

        info!(
            domain = %config.domain,
            site = %config.site,
            registry = %config.registry.url,
            authenticated = config.registry.openidc.is_some(),
            "Registered registry resolver"
        );
        Ok(())
    }
}
