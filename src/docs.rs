// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Cartera API", description = "Carteira de clientes, dívidas e fechamentos por vendedor"),
    paths(
        handlers::health,

        // --- Salespeople ---
        handlers::salespeople::list_salespeople,
        handlers::salespeople::get_salesperson,
        handlers::salespeople::create_salesperson,
        handlers::salespeople::update_salesperson,
        handlers::salespeople::delete_salesperson,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::list_client_sales,
        handlers::sales::get_sale,
        handlers::sales::create_sale,
        handlers::sales::update_sale,
        handlers::sales::delete_sale,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::list_client_payments,
        handlers::payments::get_payment,
        handlers::payments::create_payment,
        handlers::payments::update_payment,
        handlers::payments::delete_payment,

        // --- Returns ---
        handlers::returns::list_returns,
        handlers::returns::get_return,
        handlers::returns::create_return,
        handlers::returns::update_return,
        handlers::returns::delete_return,

        // --- Dashboard ---
        handlers::dashboard::get_kpis,
        handlers::dashboard::get_salesperson_rankings,
        handlers::dashboard::get_collector_rankings,
        handlers::dashboard::get_delinquent,
        handlers::dashboard::get_opportunities,
        handlers::dashboard::get_historical,

        // --- Month closures ---
        handlers::closures::create_closure,
        handlers::closures::list_closures,
        handlers::closures::get_closure,
        handlers::closures::update_closure,
        handlers::closures::delete_closure,
        handlers::closures::closure_pdf,

        // --- Import / Analytics / Historical ---
        handlers::import::import_clients,
        handlers::analytics::get_comparison,
        handlers::analytics::get_monthly,
        handlers::analytics::get_profitability,
        handlers::analytics::get_trends,
        handlers::analytics::get_bad_debt,
        handlers::analytics::get_alerts,
        handlers::analytics::get_alerts_config,
        handlers::historical::get_client_history,
    ),
    components(
        schemas(
            // --- Salespeople ---
            models::salesperson::Salesperson,
            models::salesperson::SalespersonRef,
            models::salesperson::SalespersonDetail,
            handlers::salespeople::SalespersonPayload,

            // --- Clients ---
            models::client::Client,
            models::client::ClientSummary,
            models::client::ClientDetail,
            handlers::clients::ClientPayload,

            // --- Ledger ---
            models::ledger::Sale,
            models::ledger::Payment,
            models::ledger::Return,
            models::ledger::SaleEntry,
            models::ledger::PaymentEntry,
            models::ledger::ReturnEntry,
            handlers::sales::CreateSalePayload,
            handlers::sales::UpdateSalePayload,
            handlers::payments::CreatePaymentPayload,
            handlers::payments::UpdatePaymentPayload,
            handlers::returns::CreateReturnPayload,
            handlers::returns::UpdateReturnPayload,

            // --- Dashboard ---
            models::dashboard::DashboardKpis,
            models::dashboard::ClassifiedClient,
            models::dashboard::SalespersonRanking,
            models::dashboard::CollectorRanking,
            models::dashboard::ClientStanding,

            // --- Month closures ---
            models::closure::MonthClosure,
            models::closure::MonthClosureView,
            models::closure::PeriodMetrics,
            handlers::closures::CreateClosurePayload,
            handlers::closures::UpdateClosurePayload,

            // --- Analytics ---
            models::analytics::SalespersonComparison,
            models::analytics::MonthlySalespersonData,
            models::analytics::MonthlyReport,
            models::analytics::SalespersonProfitability,
            models::analytics::TrendPoint,
            models::analytics::TrendReport,
            models::analytics::DebtorActivity,
            models::analytics::ClientRisk,
            models::analytics::BadDebtSummary,
            models::analytics::BadDebtReport,
            models::analytics::AlertThresholds,
            models::analytics::AlertKind,
            models::analytics::AlertSeverity,
            models::analytics::AlertPriority,
            models::analytics::IdleSalesperson,
            models::analytics::AlertData,
            models::analytics::BusinessAlert,
            models::analytics::AlertSummary,
            models::analytics::AlertsReport,

            // --- Historical ---
            models::historical::HistoricalSale,
            models::historical::HistoricalPayment,
            models::historical::HistoricalPeriodSummary,
            models::historical::HistoricalOverview,
            models::historical::ClientHistory,

            // --- Import ---
            models::import::ImportedClient,
            models::import::ImportFailure,
            models::import::ImportReport,
        )
    ),
    tags(
        (name = "Health", description = "Estado do servidor"),
        (name = "Salespeople", description = "Cadastro de vendedores"),
        (name = "Clients", description = "Clientes e dívidas"),
        (name = "Sales", description = "Vendas (aumentam a dívida)"),
        (name = "Payments", description = "Pagamentos (reduzem a dívida)"),
        (name = "Returns", description = "Devoluções de mercadoria"),
        (name = "Dashboard", description = "Indicadores, inadimplência e rankings"),
        (name = "Month Closures", description = "Fechamentos de período"),
        (name = "Import", description = "Importação de clientes por CSV"),
        (name = "Analytics", description = "Comparativos por vendedor"),
        (name = "Historical", description = "Dados do sistema legado")
    )
)]
pub struct ApiDoc;
