use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use journey_persist::JsonTable;
use journey_types::ToolName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_args, schedule, AgentTool, ToolContext};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub company_name: String,
    pub name: String,
    pub domain: String,
    pub email: String,
    pub phone: String,
    pub request_date: NaiveDate,
    #[serde(default)]
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OnboardArgs {
    company_name: String,
    name: String,
    domain: String,
    email: String,
    phone: String,
    #[serde(default)]
    request_date: Option<String>,
}

/// Creates a customer profile, or returns the existing one for a known email.
pub struct OnboardCustomerTool {
    profiles: JsonTable<Customer>,
}

impl OnboardCustomerTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            profiles: JsonTable::new(path),
        }
    }
}

#[async_trait]
impl AgentTool for OnboardCustomerTool {
    fn name(&self) -> ToolName {
        ToolName::OnboardCustomer
    }

    fn description(&self) -> &'static str {
        "Register the customer before booking. Requires company name, contact name, business domain, email and phone. Returns a customer_id."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "company_name": { "type": "string" },
                "name": { "type": "string" },
                "domain": { "type": "string", "description": "Business domain or industry" },
                "email": { "type": "string" },
                "phone": { "type": "string" },
                "request_date": { "type": "string", "description": "YYYY-MM-DD, defaults to today" }
            },
            "required": ["company_name", "name", "domain", "email", "phone"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value> {
        let args: OnboardArgs = parse_args(self.name(), args)?;
        let email = args.email.trim().to_lowercase();
        if !email.contains('@') {
            return Ok(json!({ "status": "rejected", "reason": format!("'{}' is not a valid email", args.email) }));
        }
        let request_date = args
            .request_date
            .as_deref()
            .and_then(schedule::parse_date)
            .unwrap_or_else(|| Local::now().date_naive());
        let thread_id = ctx.thread_id.clone();

        let (customer, created) = self
            .profiles
            .update(move |rows| {
                if let Some(existing) = rows.iter().find(|c| c.email == email) {
                    return (existing.clone(), false);
                }
                let customer = Customer {
                    customer_id: format!("CUST-{:03}", rows.len() + 1),
                    company_name: args.company_name.trim().to_string(),
                    name: args.name.trim().to_string(),
                    domain: args.domain.trim().to_string(),
                    email,
                    phone: args.phone.trim().to_string(),
                    request_date,
                    thread_id: Some(thread_id),
                };
                rows.push(customer.clone());
                (customer, true)
            })
            .await?;

        if created {
            tracing::info!(customer_id = %customer.customer_id, "Customer onboarded");
        }
        Ok(json!({
            "status": if created { "created" } else { "existing" },
            "customer": customer,
        }))
    }
}
