#[cfg(test)]
mod integration_tests {
    use axum::http::{header, HeaderValue, StatusCode};
    use chrono::Datelike;
    use axum_test::multipart::{MultipartForm, Part};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::models::scope::SalespersonScope;
    use crate::services::closure_service::NewClosure;
    use crate::test_utils::test_utils::{
        backdate_client, backdate_row, db_test_server, exclusive_db, seed_client, seed_payment,
        seed_sale, seed_salesperson, shared_db, test_server, unique,
    };

    // =========================================================================
    //  Caminhos que falham antes de tocar no banco
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let server = test_server();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({ "message": "Server is running" }));
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let server = test_server();

        let response = server.get("/api-docs/openapi.json").await;

        response.assert_status(StatusCode::OK);
        let doc: Value = response.json();
        assert!(doc["paths"]["/api/month-closures"].is_object());
        assert!(doc["paths"]["/api/dashboard/delinquent"].is_object());
    }

    #[tokio::test]
    async fn test_invalid_scope_is_rejected_in_requested_language() {
        let server = test_server();

        let response = server
            .get("/api/clients")
            .add_query_param("salespersonId", "bego")
            .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("es-ES,es;q=0.9"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "salespersonId debe ser el id de un vendedor o TODOS.");
        assert_eq!(body["details"]["salespersonId"], "bego");
    }

    #[tokio::test]
    async fn test_malformed_uuid_in_path_is_bad_request() {
        let server = test_server();

        let response = server.get("/api/clients/not-a-uuid").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_salesperson_without_name_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/salespeople")
            .json(&json!({ "name": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Name is required");
        assert!(body["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_client_without_salesperson_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/clients")
            .json(&json!({ "name": "María López" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["details"]["salesperson_id"].is_array());
    }

    #[tokio::test]
    async fn test_non_positive_sale_amount_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/sales")
            .json(&json!({
                "clientId": Uuid::new_v4(),
                "amount": 0,
                "description": "pedido"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Amount must be greater than zero");
    }

    #[tokio::test]
    async fn test_payment_without_amount_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/payments")
            .json(&json!({ "clientId": Uuid::new_v4(), "paymentMethod": "efectivo" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["details"]["amount"].is_array());
    }

    #[tokio::test]
    async fn test_returns_listing_requires_a_salesperson() {
        let server = test_server();

        let response = server
            .get("/api/returns")
            .add_query_param("salespersonId", "TODOS")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "salespersonId is required");
    }

    #[tokio::test]
    async fn test_inverted_date_window_is_rejected() {
        let server = test_server();

        let response = server
            .get("/api/dashboard/kpis")
            .add_query_param("dateFrom", "2025-10-31")
            .add_query_param("dateTo", "2025-10-01")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_closure_without_name_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/month-closures")
            .json(&json!({ "name": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "The closure name is required");
    }

    #[tokio::test]
    async fn test_closure_with_invalid_scope_is_rejected() {
        let server = test_server();

        let response = server
            .post("/api/month-closures")
            .json(&json!({ "name": "Outubro", "salespersonId": "bego" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_monthly_report_rejects_invalid_month() {
        let server = test_server();

        let response = server
            .get("/api/analytics/monthly")
            .add_query_param("year", 2025)
            .add_query_param("month", 13)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_historical_code_must_be_numeric() {
        let server = test_server();

        let response = server.get("/api/historical/clients/ABC").await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_without_file_field_is_rejected() {
        let server = test_server();

        let form = MultipartForm::new().add_text("other", "nada");
        let response = server
            .post("/api/import/clients-from-csv")
            .multipart(form)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_alert_thresholds_are_published() {
        let server = test_server();

        let response = server.get("/api/analytics/alerts/config").await;

        response.assert_status(StatusCode::OK);
        let config: Value = response.json();
        assert_eq!(config["oldDebtDays"], 90);
        assert_eq!(config["idleSalespersonDays"], 30);
        assert_eq!(config["vipDebt"].as_f64(), Some(2000.0));
        assert_eq!(config["opportunityMinDebt"].as_f64(), Some(200.0));
        assert_eq!(config["opportunityMaxDebt"].as_f64(), Some(1000.0));
    }

    #[tokio::test]
    async fn test_negative_bad_debt_threshold_is_rejected() {
        let server = test_server();

        let response = server
            .get("/api/analytics/bad-debt")
            .add_query_param("daysThreshold", -5)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_alerts_reject_an_invalid_scope() {
        let server = test_server();

        let response = server
            .get("/api/analytics/alerts")
            .add_query_param("salespersonId", "bego")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    // =========================================================================
    //  Propriedades sobre um PostgreSQL real
    // =========================================================================

    fn money(value: &Value) -> f64 {
        value.as_f64().expect("valor monetário deve ser número")
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_debt_is_sales_minus_payments() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;

        // Sem movimento a dívida é zero
        let response = server.get(&format!("/api/clients/{}", client.id)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(money(&response.json::<Value>()["debt"]), 0.0);

        seed_sale(&state, client.id, Decimal::new(4000, 2)).await;
        seed_sale(&state, client.id, Decimal::new(2550, 2)).await;
        seed_payment(&state, client.id, Decimal::new(1000, 2)).await;

        let response = server.get(&format!("/api/clients/{}", client.id)).await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(money(&body["debt"]), 55.5);
        assert_eq!(body["sales"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["payments"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_old_debt_is_delinquent_and_not_an_opportunity() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;

        seed_sale(&state, client.id, Decimal::new(10000, 2)).await;
        seed_sale(&state, client.id, Decimal::new(5000, 2)).await;
        seed_payment(&state, client.id, Decimal::new(3000, 2)).await;
        backdate_client(&state.db_pool, client.id, 90).await;

        let scope = salesperson.id.to_string();

        let response = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", &scope)
            .await;
        response.assert_status(StatusCode::OK);
        let delinquent: Vec<Value> = response.json();
        let entry = delinquent
            .iter()
            .find(|c| c["id"] == json!(client.id))
            .expect("cliente deveria estar inadimplente");
        assert_eq!(money(&entry["debt"]), 120.0);

        let response = server
            .get("/api/dashboard/opportunities")
            .add_query_param("salespersonId", &scope)
            .await;
        response.assert_status(StatusCode::OK);
        let opportunities: Vec<Value> = response.json();
        assert!(opportunities.iter().all(|c| c["id"] != json!(client.id)));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_delinquent_list_is_capped_and_sorted() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        for i in 1..=12 {
            let client = seed_client(&state, salesperson.id).await;
            seed_sale(&state, client.id, Decimal::new(i * 1000, 2)).await;
            backdate_client(&state.db_pool, client.id, 90).await;
        }
        // Pagou recentemente: fica fora
        let recent = seed_client(&state, salesperson.id).await;
        seed_sale(&state, recent.id, Decimal::new(99900, 2)).await;
        seed_payment(&state, recent.id, Decimal::new(100, 2)).await;

        let response = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let list: Vec<Value> = response.json();

        assert_eq!(list.len(), 10);
        let debts: Vec<f64> = list.iter().map(|c| money(&c["debt"])).collect();
        assert!(debts.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(debts[0], 120.0);
        assert!(list.iter().all(|c| c["id"] != json!(recent.id)));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_opportunities_are_small_positive_debts_ascending() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        for cents in [7400, 1000, 7500, 3000] {
            let client = seed_client(&state, salesperson.id).await;
            seed_sale(&state, client.id, Decimal::new(cents, 2)).await;
        }
        // Dívida zerada não é oportunidade
        let settled = seed_client(&state, salesperson.id).await;
        seed_sale(&state, settled.id, Decimal::new(2000, 2)).await;
        seed_payment(&state, settled.id, Decimal::new(2000, 2)).await;

        let response = server
            .get("/api/dashboard/opportunities")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let list: Vec<Value> = response.json();

        let debts: Vec<f64> = list.iter().map(|c| money(&c["debt"])).collect();
        assert_eq!(debts, vec![10.0, 30.0, 74.0]);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_closures_of_a_scope_are_contiguous() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;
        seed_sale(&state, client.id, Decimal::new(10000, 2)).await;

        let scope = SalespersonScope::Salesperson(salesperson.id);
        let today = chrono::Utc::now().date_naive();
        let yesterday = today.pred_opt().expect("data válida");

        // O primeiro fechamento começa no dia 1 do mês
        let first = state
            .closure_service
            .create(
                &state.db_pool,
                NewClosure {
                    name: "Primeiro",
                    scope,
                    description: None,
                    closed_by: None,
                },
                yesterday,
            )
            .await
            .expect("primeiro fechamento");
        assert_eq!(first.closure.date_from, yesterday.with_day(1).expect("dia 1"));

        let response = server
            .post("/api/month-closures")
            .json(&json!({ "name": "Segundo", "salespersonId": salesperson.id }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let second: Value = response.json();
        assert_eq!(second["dateFrom"], json!(today));
        assert_eq!(second["dateTo"], json!(today));
        assert_eq!(money(&second["totalSales"]), 100.0);

        // Mesmo dia de novo: nada a fechar
        let response = server
            .post("/api/month-closures")
            .json(&json!({ "name": "Terceiro", "salespersonId": salesperson.id }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_import_keeps_good_rows_and_reports_bad_ones() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson_name = unique("Importador");

        let csv = format!(
            "nombre_cliente,telefono_cliente,email_cliente,nombre_vendedor,deuda_inicial\n\
             {a},600111111,,{sp},150.50\n\
             {b},600222222,b@example.com,{sp},0\n\
             ,600333333,,{sp},10\n\
             {c},600444444,,{sp},-5\n",
            a = unique("Cliente A"),
            b = unique("Cliente B"),
            c = unique("Cliente C"),
            sp = salesperson_name,
        );

        let part = Part::bytes(csv.into_bytes())
            .file_name("clientes.csv")
            .mime_type("text/csv");
        let response = server
            .post("/api/import/clients-from-csv")
            .multipart(MultipartForm::new().add_part("file", part))
            .await;

        response.assert_status(StatusCode::OK);
        let report: Value = response.json();
        assert_eq!(report["imported"], 2);
        assert_eq!(report["failed"], 2);
        assert_eq!(report["errors"].as_array().map(Vec::len), Some(2));

        let results = report["results"].as_array().expect("results");
        let with_balance: Vec<&Value> =
            results.iter().filter(|r| !r["saleId"].is_null()).collect();
        assert_eq!(with_balance.len(), 1);

        // Todos os clientes importados ficam com o mesmo vendedor
        let salesperson_ids: Vec<&Value> = results.iter().map(|r| &r["salespersonId"]).collect();
        assert!(salesperson_ids.windows(2).all(|w| w[0] == w[1]));

        let client_id: Uuid = serde_json::from_value(with_balance[0]["clientId"].clone())
            .expect("clientId");
        let detail = state
            .client_service
            .get_detail(&state.db_pool, client_id)
            .await
            .expect("cliente importado");
        assert_eq!(detail.debt, Decimal::new(15050, 2));
        assert_eq!(detail.sales.len(), 1);
        assert_eq!(detail.sales[0].description, "migrated initial balance");
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_deleting_a_client_removes_its_movements() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;
        let sale_id = seed_sale(&state, client.id, Decimal::new(5000, 2)).await;
        let payment_id = seed_payment(&state, client.id, Decimal::new(1000, 2)).await;

        let response = server.delete(&format!("/api/clients/{}", client.id)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/sales/{}", sale_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/api/payments/{}", payment_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/api/clients/{}", client.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_salesperson_with_clients_cannot_be_deleted() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        seed_client(&state, salesperson.id).await;

        let response = server
            .delete(&format!("/api/salespeople/{}", salesperson.id))
            .await;

        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_kpis_are_scoped_and_default_to_the_last_thirty_days() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;

        seed_sale(&state, client.id, Decimal::new(10000, 2)).await;
        seed_payment(&state, client.id, Decimal::new(3000, 2)).await;
        let old_sale = seed_sale(&state, client.id, Decimal::new(5000, 2)).await;
        backdate_row(&state.db_pool, "sales", old_sale, 40).await;

        // Movimento de outro vendedor fica fora do escopo
        let other = seed_salesperson(&state).await;
        let foreign = seed_client(&state, other.id).await;
        seed_sale(&state, foreign.id, Decimal::new(99900, 2)).await;

        let scope = salesperson.id.to_string();
        let response = server
            .get("/api/dashboard/kpis")
            .add_query_param("salespersonId", &scope)
            .await;
        response.assert_status(StatusCode::OK);
        let kpis: Value = response.json();
        assert_eq!(money(&kpis["totalDebt"]), 120.0);
        assert_eq!(money(&kpis["totalSalesLast30Days"]), 100.0);
        assert_eq!(money(&kpis["totalPaymentsLast30Days"]), 30.0);
        assert_eq!(kpis["periodLabel"], "Last 30 days");

        // Janela explícita: só a venda antiga; a dívida continua sem recorte
        let today = chrono::Utc::now().date_naive();
        let from = today - chrono::Duration::days(45);
        let to = today - chrono::Duration::days(35);
        let response = server
            .get("/api/dashboard/kpis")
            .add_query_param("salespersonId", &scope)
            .add_query_param("dateFrom", from.to_string())
            .add_query_param("dateTo", to.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let kpis: Value = response.json();
        assert_eq!(money(&kpis["totalDebt"]), 120.0);
        assert_eq!(money(&kpis["totalSalesLast30Days"]), 50.0);
        assert_eq!(money(&kpis["totalPaymentsLast30Days"]), 0.0);
        let label = format!("{} - {}", from.format("%d/%m/%Y"), to.format("%d/%m/%Y"));
        assert_eq!(kpis["periodLabel"], json!(label));

        // Só uma das datas: volta aos últimos 30 dias
        let response = server
            .get("/api/dashboard/kpis")
            .add_query_param("salespersonId", &scope)
            .add_query_param("dateFrom", from.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let kpis: Value = response.json();
        assert_eq!(money(&kpis["totalSalesLast30Days"]), 100.0);
        assert_eq!(kpis["periodLabel"], "Last 30 days");
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_salesperson_detail_sums_the_debt_of_its_clients() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        let first = seed_client(&state, salesperson.id).await;
        seed_sale(&state, first.id, Decimal::new(10000, 2)).await;
        seed_payment(&state, first.id, Decimal::new(2500, 2)).await;
        let second = seed_client(&state, salesperson.id).await;
        seed_sale(&state, second.id, Decimal::new(4000, 2)).await;
        seed_client(&state, salesperson.id).await;

        let response = server
            .get(&format!("/api/salespeople/{}", salesperson.id))
            .await;
        response.assert_status(StatusCode::OK);
        let detail: Value = response.json();
        assert_eq!(money(&detail["totalDebt"]), 115.0);
        assert_eq!(detail["clients"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_general_closure_chain_ignores_salesperson_closures() {
        // Compara com a dívida de todos os clientes: nenhum outro teste pode
        // escrever enquanto isso
        let _db = exclusive_db().await;
        let (server, state) = db_test_server().await;
        sqlx::query("DELETE FROM month_closures WHERE salesperson_id IS NULL")
            .execute(&state.db_pool)
            .await
            .expect("Falha ao limpar fechamentos gerais");

        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;
        seed_sale(&state, client.id, Decimal::new(20000, 2)).await;

        server
            .post("/api/month-closures")
            .json(&json!({ "name": "Vendedor", "salespersonId": salesperson.id }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/month-closures")
            .json(&json!({ "name": "Geral" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let general: Value = response.json();

        let today = chrono::Utc::now().date_naive();
        assert_eq!(general["dateFrom"], json!(today.with_day(1).expect("dia 1")));
        assert_eq!(general["dateTo"], json!(today));
        assert!(general["salespersonId"].is_null());

        let kpis: Value = server.get("/api/dashboard/kpis").await.json();
        assert_eq!(money(&general["totalDebt"]), money(&kpis["totalDebt"]));

        // TODOS é a mesma cadeia geral, que já fechou hoje
        server
            .post("/api/month-closures")
            .json(&json!({ "name": "Geral de novo", "salespersonId": "TODOS" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_delinquent_date_from_replaces_the_sixty_day_window() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;
        seed_sale(&state, client.id, Decimal::new(10000, 2)).await;
        let payment = seed_payment(&state, client.id, Decimal::new(1000, 2)).await;
        backdate_row(&state.db_pool, "payments", payment, 20).await;

        let scope = salesperson.id.to_string();
        let today = chrono::Utc::now().date_naive();
        let listed = |list: &Vec<Value>| list.iter().any(|c| c["id"] == json!(client.id));

        // Pagou há 20 dias: dentro dos 60
        let list: Vec<Value> = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", &scope)
            .await
            .json();
        assert!(!listed(&list));

        // Nada pago desde 10 dias atrás
        let since = today - chrono::Duration::days(10);
        let list: Vec<Value> = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", &scope)
            .add_query_param("dateFrom", since.to_string())
            .await
            .json();
        assert!(listed(&list));

        let since = today - chrono::Duration::days(30);
        let list: Vec<Value> = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", &scope)
            .add_query_param("dateFrom", since.to_string())
            .await
            .json();
        assert!(!listed(&list));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_delinquency_starts_after_sixty_days_without_payment() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        let mut clients = Vec::new();
        for days in [59, 61] {
            let client = seed_client(&state, salesperson.id).await;
            seed_sale(&state, client.id, Decimal::new(10000, 2)).await;
            let payment = seed_payment(&state, client.id, Decimal::new(1000, 2)).await;
            backdate_row(&state.db_pool, "payments", payment, days).await;
            clients.push(client.id);
        }

        let list: Vec<Value> = server
            .get("/api/dashboard/delinquent")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await
            .json();
        let ids: Vec<&Value> = list.iter().map(|c| &c["id"]).collect();

        assert!(!ids.contains(&&json!(clients[0])), "59 dias ainda não é inadimplência");
        assert!(ids.contains(&&json!(clients[1])), "61 dias é inadimplência");
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_bad_debt_ranks_by_risk_then_debt() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        // 200 dias sem venda e nunca pagou: risco 70
        let stale = seed_client(&state, salesperson.id).await;
        let sale = seed_sale(&state, stale.id, Decimal::new(40000, 2)).await;
        backdate_row(&state.db_pool, "sales", sale, 200).await;

        // Mais de um ano sem venda: risco 90
        let ancient = seed_client(&state, salesperson.id).await;
        let sale = seed_sale(&state, ancient.id, Decimal::new(10000, 2)).await;
        let payment = seed_payment(&state, ancient.id, Decimal::new(2000, 2)).await;
        backdate_row(&state.db_pool, "sales", sale, 400).await;
        backdate_row(&state.db_pool, "payments", payment, 380).await;

        // Venda recente fica fora
        let fresh = seed_client(&state, salesperson.id).await;
        seed_sale(&state, fresh.id, Decimal::new(30000, 2)).await;

        let scope = salesperson.id.to_string();
        let response = server
            .get("/api/analytics/bad-debt")
            .add_query_param("salespersonId", &scope)
            .await;
        response.assert_status(StatusCode::OK);
        let report: Value = response.json();

        let candidates = report["badDebtCandidates"].as_array().expect("lista");
        let ids: Vec<&Value> = candidates.iter().map(|c| &c["id"]).collect();
        assert_eq!(ids, vec![&json!(ancient.id), &json!(stale.id)]);
        assert_eq!(candidates[0]["riskScore"], 90);
        assert_eq!(candidates[1]["riskScore"], 70);
        assert_eq!(report["summary"]["totalRiskyClients"], 2);
        assert_eq!(money(&report["summary"]["totalRiskyDebt"]), 480.0);
        assert_eq!(report["summary"]["highRiskClients"], 2);

        let report: Value = server
            .get("/api/analytics/bad-debt")
            .add_query_param("salespersonId", &scope)
            .add_query_param("daysThreshold", 300)
            .await
            .json();
        assert_eq!(report["badDebtCandidates"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_alerts_group_clients_and_idle_salespeople() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;

        let vip = seed_client(&state, salesperson.id).await;
        seed_sale(&state, vip.id, Decimal::new(250000, 2)).await;

        let opportunity = seed_client(&state, salesperson.id).await;
        let sale = seed_sale(&state, opportunity.id, Decimal::new(50000, 2)).await;
        backdate_row(&state.db_pool, "sales", sale, 45).await;

        let old = seed_client(&state, salesperson.id).await;
        let sale = seed_sale(&state, old.id, Decimal::new(10000, 2)).await;
        backdate_row(&state.db_pool, "sales", sale, 100).await;

        let response = server
            .get("/api/analytics/alerts")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let report: Value = response.json();

        let alert = |id: &str| {
            report["alerts"]
                .as_array()
                .and_then(|alerts| alerts.iter().find(|a| a["id"] == id))
                .cloned()
        };
        let holds = |id: &str, client: Uuid| {
            alert(id).is_some_and(|a| {
                a["data"]
                    .as_array()
                    .is_some_and(|rows| rows.iter().any(|r| r["id"] == json!(client)))
            })
        };
        assert!(holds("old_debt_clients", old.id));
        assert!(holds("collection_opportunities", opportunity.id));
        assert!(holds("vip_clients", vip.id));
        assert!(alert("idle_salespeople").is_none(), "vendeu hoje");
        assert_eq!(report["summary"]["critical"], 1);
        assert_eq!(report["summary"]["success"], 1);

        // Vendedor sem nenhum movimento
        let idle = seed_salesperson(&state).await;
        let report: Value = server
            .get("/api/analytics/alerts")
            .add_query_param("salespersonId", idle.id.to_string())
            .await
            .json();
        let alerts = report["alerts"].as_array().expect("lista");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["id"], "idle_salespeople");
        assert_eq!(alerts[0]["type"], "warning");
        assert_eq!(alerts[0]["data"][0]["salespersonId"], json!(idle.id));
        assert_eq!(report["summary"]["total"], 1);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_trends_are_daily_series() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;

        seed_sale(&state, client.id, Decimal::new(10000, 2)).await;
        let earlier = seed_sale(&state, client.id, Decimal::new(5000, 2)).await;
        backdate_row(&state.db_pool, "sales", earlier, 3).await;
        seed_payment(&state, client.id, Decimal::new(2000, 2)).await;

        let response = server
            .get("/api/analytics/trends")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let report: Value = response.json();

        let today = chrono::Utc::now().date_naive();
        let sales = report["salesTrend"].as_array().expect("lista");
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0]["period"], json!(today - chrono::Duration::days(3)));
        assert_eq!(money(&sales[0]["amount"]), 50.0);
        assert_eq!(sales[1]["period"], json!(today));
        assert_eq!(sales[1]["count"], 1);

        let payments = report["paymentsTrend"].as_array().expect("lista");
        assert_eq!(payments.len(), 1);
        assert_eq!(money(&payments[0]["amount"]), 20.0);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
    async fn test_profitability_reports_recovery_and_commission() {
        let _db = shared_db().await;
        let (server, state) = db_test_server().await;
        let salesperson = seed_salesperson(&state).await;
        let client = seed_client(&state, salesperson.id).await;
        seed_sale(&state, client.id, Decimal::new(20000, 2)).await;
        seed_payment(&state, client.id, Decimal::new(5000, 2)).await;

        let response = server
            .get("/api/analytics/profitability")
            .add_query_param("salespersonId", salesperson.id.to_string())
            .await;
        response.assert_status(StatusCode::OK);
        let rows: Vec<Value> = response.json();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["salespersonId"], json!(salesperson.id));
        assert_eq!(money(&rows[0]["recoveryRate"]), 25.0);
        assert_eq!(money(&rows[0]["estimatedCommission"]), 5.0);
        assert_eq!(money(&rows[0]["avgSalePerClient"]), 200.0);
    }
}
