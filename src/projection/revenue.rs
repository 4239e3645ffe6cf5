//! Revenue projection for recoverable, channel-acquired and direct clients

use log::warn;

use crate::plan::{
    pct, BusinessPlan, DirectClient, NewClientChannel, RecoverableClient, ServiceType,
};
use super::calendar::{FiscalYear, ProjectCalendar};
use super::engine::ProjectionConfig;

/// One contract of a recurring recoverable client. Renewals start the month
/// after the previous instance ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContractInstance {
    /// 1-indexed position in the renewal chain
    pub index: u32,
    pub start_month: u32,
    pub end_month: u32,
    /// Annual amount before ramp-up and price increases
    pub potential: f64,
}

impl ContractInstance {
    /// Revenue recognized inside `year`, with a linear ramp-up over the
    /// first `ramp_up_months` of the instance
    pub fn revenue_in(&self, year: &FiscalYear, ramp_up_months: u32) -> f64 {
        let from = self.start_month.max(year.first_month);
        let to = self.end_month.min(year.last_month);
        if to < from {
            return 0.0;
        }

        let monthly = self.potential / 12.0;
        (from..=to)
            .map(|month| {
                let month_in_instance = month - self.start_month + 1;
                let ramp = if ramp_up_months > 0 && month_in_instance <= ramp_up_months {
                    month_in_instance as f64 / ramp_up_months as f64
                } else {
                    1.0
                };
                monthly * ramp
            })
            .sum()
    }
}

/// Lazy sequence of contract instances, each renewal decaying the potential
/// by the renewal probability. Bounded by a negligible-potential threshold
/// and a hard instance ceiling.
#[derive(Debug, Clone)]
pub struct RenewalChain {
    next: Option<ContractInstance>,
    renewal: f64,
    duration: u32,
    negligible_potential: f64,
    max_instances: u32,
}

impl RenewalChain {
    pub fn new(client: &RecoverableClient, config: &ProjectionConfig) -> Self {
        let duration = client.contract_duration_months;
        let next = (duration > 0).then(|| ContractInstance {
            index: 1,
            start_month: client.contract_start_month,
            end_month: client.contract_start_month.saturating_add(duration - 1),
            potential: client.recovered_amount(),
        });

        Self {
            next,
            renewal: pct(client.renewal_probability),
            duration,
            negligible_potential: config.negligible_potential,
            max_instances: config.max_contract_instances,
        }
    }
}

impl Iterator for RenewalChain {
    type Item = ContractInstance;

    fn next(&mut self) -> Option<ContractInstance> {
        let current = self.next.take()?;
        if current.potential <= self.negligible_potential {
            return None;
        }
        if current.index > self.max_instances {
            warn!(
                "Renewal chain stopped at {} instances (potential {:.2} still above threshold)",
                self.max_instances, current.potential
            );
            return None;
        }

        if self.renewal > 0.0 {
            self.next = Some(ContractInstance {
                index: current.index + 1,
                start_month: current.end_month.saturating_add(1),
                end_month: current.end_month.saturating_add(self.duration),
                potential: current.potential * self.renewal,
            });
        }

        Some(current)
    }
}

/// Revenue of one fiscal year, split by acquisition mode
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearRevenue {
    pub recoverable: f64,
    pub new_clients: f64,
    pub direct: f64,
    /// Sum of revenue x collection days over every cohort
    weighted_collection_days: f64,
}

impl YearRevenue {
    #[cfg(test)]
    pub(crate) fn direct_only(amount: f64, collection_days: f64) -> Self {
        Self {
            direct: amount,
            weighted_collection_days: amount * collection_days,
            ..Default::default()
        }
    }

    pub fn total(&self) -> f64 {
        self.recoverable + self.new_clients + self.direct
    }

    /// Revenue-weighted collection period; `default_days` when there is no revenue
    pub fn collection_days(&self, default_days: f64) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.weighted_collection_days / total
        } else {
            default_days
        }
    }
}

/// Monthly spend of a channel in a fiscal year, grown geometrically
pub(crate) fn channel_spend(channel: &NewClientChannel, year: &FiscalYear, growth: f64) -> f64 {
    channel.monthly_spend * year.compound(growth)
}

pub struct RevenueProjection<'a> {
    plan: &'a BusinessPlan,
    calendar: &'a ProjectCalendar,
    config: &'a ProjectionConfig,
}

impl<'a> RevenueProjection<'a> {
    pub fn new(
        plan: &'a BusinessPlan,
        calendar: &'a ProjectCalendar,
        config: &'a ProjectionConfig,
    ) -> Self {
        Self { plan, calendar, config }
    }

    /// Project one year. `channel_base` is the channel revenue carried from
    /// the previous year; the returned base is carried into the next one.
    pub fn project_year(&self, year: &FiscalYear, channel_base: f64) -> (YearRevenue, f64) {
        let general = &self.plan.general;
        let default_days = general.days_to_collect;
        let mut revenue = YearRevenue::default();

        for client in &self.plan.recoverable_clients {
            let amount = self.recoverable(client, year);
            revenue.recoverable += amount;
            revenue.weighted_collection_days +=
                amount * client.collection_days.unwrap_or(default_days);
        }

        let growth = pct(general.revenue_growth_rate);
        let new_revenue: f64 = self
            .plan
            .new_client_channels
            .iter()
            .map(|channel| new_channel_revenue(channel, year, growth))
            .sum();
        let channel_base = channel_base * (1.0 - pct(general.churn_rate)) + new_revenue;
        revenue.new_clients = channel_base;
        revenue.weighted_collection_days += channel_base * default_days;

        for client in &self.plan.direct_clients {
            let amount = direct_revenue(client, year);
            revenue.direct += amount;
            revenue.weighted_collection_days += amount * default_days;
        }

        (revenue, channel_base)
    }

    fn recoverable(&self, client: &RecoverableClient, year: &FiscalYear) -> f64 {
        match client.service_type {
            ServiceType::OneOff => {
                if year.contains(client.contract_start_month) {
                    client.recovered_amount()
                } else {
                    0.0
                }
            }
            ServiceType::Recurring => {
                let increase = self
                    .calendar
                    .year_of(client.contract_start_month)
                    .filter(|&start_year| year.index >= start_year)
                    .map_or(1.0, |start_year| {
                        (1.0 + pct(client.annual_increase)).powi((year.index - start_year) as i32)
                    });

                let recognized: f64 = RenewalChain::new(client, self.config)
                    .take_while(|instance| instance.start_month <= year.last_month)
                    .map(|instance| instance.revenue_in(year, client.ramp_up_months))
                    .sum();

                recognized * increase
            }
        }
    }
}

/// Revenue signed this year through a channel, prorated by its active months
fn new_channel_revenue(channel: &NewClientChannel, year: &FiscalYear, growth: f64) -> f64 {
    let active = year.active_months(channel.start_month, None);
    if active == 0 {
        return 0.0;
    }
    let contracts = channel.monthly_contracts(channel_spend(channel, year, growth));
    contracts * channel.average_contract_value * active as f64 / 12.0
}

fn direct_revenue(client: &DirectClient, year: &FiscalYear) -> f64 {
    match client.service_type {
        ServiceType::OneOff => {
            if year.contains(client.start_month) {
                client.number_of_clients * client.contract_value
            } else {
                0.0
            }
        }
        ServiceType::Recurring => {
            let active = year.active_months(client.start_month, None);
            client.number_of_clients * client.annual_value() * active as f64 / 12.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{General, ValuePeriod};
    use approx::assert_relative_eq;

    fn plan_with(years: u32) -> BusinessPlan {
        BusinessPlan {
            general: General {
                time_horizon_years: years,
                start_month: 1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn recurring_client(renewal: f64, ramp_up: u32) -> RecoverableClient {
        RecoverableClient {
            name: "Retainer".to_string(),
            prior_revenue: 120_000.0,
            recovery_probability: 100.0,
            recovery_amount_percentage: 100.0,
            service_type: ServiceType::Recurring,
            contract_start_month: 1,
            contract_duration_months: 12,
            renewal_probability: renewal,
            ramp_up_months: ramp_up,
            collection_days: None,
            annual_increase: 0.0,
        }
    }

    fn project(plan: &BusinessPlan) -> Vec<YearRevenue> {
        let calendar = ProjectCalendar::new(&plan.general);
        let config = ProjectionConfig::default();
        let projection = RevenueProjection::new(plan, &calendar, &config);
        let mut base = 0.0;
        calendar
            .fiscal_years()
            .iter()
            .map(|year| {
                let (revenue, next_base) = projection.project_year(year, base);
                base = next_base;
                revenue
            })
            .collect()
    }

    #[test]
    fn test_one_off_recognized_in_start_year_only() {
        let mut plan = plan_with(3);
        plan.recoverable_clients.push(RecoverableClient {
            prior_revenue: 100_000.0,
            recovery_probability: 50.0,
            recovery_amount_percentage: 20.0,
            service_type: ServiceType::OneOff,
            contract_start_month: 1,
            ..recurring_client(0.0, 0)
        });

        let revenue = project(&plan);
        assert_relative_eq!(revenue[0].recoverable, 10_000.0, max_relative = 1e-12);
        assert_eq!(revenue[1].recoverable, 0.0);
        assert_eq!(revenue[2].recoverable, 0.0);
    }

    #[test]
    fn test_renewal_chain_decays_geometrically() {
        let client = recurring_client(60.0, 0);
        let config = ProjectionConfig::default();
        let instances: Vec<_> = RenewalChain::new(&client, &config).take(5).collect();

        assert_eq!(instances.len(), 5);
        for (k, instance) in instances.iter().enumerate() {
            assert_eq!(instance.index, k as u32 + 1);
            assert_eq!(instance.start_month, 1 + 12 * k as u32);
            assert_relative_eq!(
                instance.potential,
                120_000.0 * 0.6_f64.powi(k as i32),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_renewal_chain_terminates() {
        let config = ProjectionConfig::default();

        let no_renewal: Vec<_> = RenewalChain::new(&recurring_client(0.0, 0), &config).collect();
        assert_eq!(no_renewal.len(), 1);

        let decaying = RenewalChain::new(&recurring_client(50.0, 0), &config);
        let last = decaying.last().unwrap();
        assert!(last.potential > config.negligible_potential);
        assert!(last.potential * 0.5 <= config.negligible_potential);

        let sticky = RenewalChain::new(&recurring_client(100.0, 0), &config).count();
        assert_eq!(sticky as u32, config.max_contract_instances);
    }

    #[test]
    fn test_renewal_months_saturate() {
        let mut client = recurring_client(50.0, 0);
        client.contract_duration_months = u32::MAX;
        let config = ProjectionConfig::default();

        let instances: Vec<_> = RenewalChain::new(&client, &config).take(3).collect();
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].end_month, u32::MAX);
        assert_eq!(instances[1].start_month, u32::MAX);
        assert_eq!(instances[2].end_month, u32::MAX);
    }

    #[test]
    fn test_recurring_revenue_follows_renewals() {
        let mut plan = plan_with(3);
        plan.recoverable_clients.push(recurring_client(50.0, 0));

        let revenue = project(&plan);
        assert_relative_eq!(revenue[0].recoverable, 120_000.0, max_relative = 1e-12);
        assert_relative_eq!(revenue[1].recoverable, 60_000.0, max_relative = 1e-12);
        assert_relative_eq!(revenue[2].recoverable, 30_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ramp_up_scales_first_months() {
        let mut plan = plan_with(1);
        plan.recoverable_clients.push(recurring_client(0.0, 4));

        let revenue = project(&plan);
        // Months 1-4 earn 1/4, 2/4, 3/4, 4/4 of the monthly amount
        let expected = 10_000.0 * (0.25 + 0.5 + 0.75 + 1.0) + 10_000.0 * 8.0;
        assert_relative_eq!(revenue[0].recoverable, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_contract_starting_after_year_contributes_nothing() {
        let mut plan = plan_with(2);
        let mut client = recurring_client(0.0, 0);
        client.contract_start_month = 19;
        plan.recoverable_clients.push(client);

        let revenue = project(&plan);
        assert_eq!(revenue[0].recoverable, 0.0);
        assert_relative_eq!(revenue[1].recoverable, 60_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_channel_revenue_churns_and_accumulates() {
        let mut plan = plan_with(2);
        plan.general.churn_rate = 20.0;
        plan.new_client_channels.push(NewClientChannel {
            name: "Ads".to_string(),
            monthly_spend: 1_000.0,
            leads_per_100: 5.0,
            conversion_rate: 10.0,
            average_contract_value: 2_400.0,
            start_month: 1,
        });

        let revenue = project(&plan);
        // 1000/100 * 5 leads * 10% = 5 contracts/month
        let yearly = 5.0 * 2_400.0;
        assert_relative_eq!(revenue[0].new_clients, yearly, max_relative = 1e-12);
        assert_relative_eq!(revenue[1].new_clients, yearly * 0.8 + yearly, max_relative = 1e-12);
    }

    #[test]
    fn test_direct_clients_prorated() {
        let mut plan = plan_with(2);
        plan.direct_clients.push(DirectClient {
            name: "Network".to_string(),
            number_of_clients: 2.0,
            start_month: 7,
            service_type: ServiceType::Recurring,
            contract_value: 500.0,
            value_period: ValuePeriod::Monthly,
        });

        let revenue = project(&plan);
        assert_relative_eq!(revenue[0].direct, 2.0 * 6_000.0 * 6.0 / 12.0, max_relative = 1e-12);
        assert_relative_eq!(revenue[1].direct, 12_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_collection_days_weighted_by_revenue() {
        let mut plan = plan_with(1);
        plan.general.days_to_collect = 30.0;
        let mut client = recurring_client(0.0, 0);
        client.collection_days = Some(90.0);
        plan.recoverable_clients.push(client);
        plan.direct_clients.push(DirectClient {
            name: "Network".to_string(),
            number_of_clients: 1.0,
            start_month: 1,
            service_type: ServiceType::Recurring,
            contract_value: 120_000.0,
            value_period: ValuePeriod::Annual,
        });

        let revenue = project(&plan);
        assert_relative_eq!(revenue[0].collection_days(30.0), 60.0, max_relative = 1e-12);
        assert_eq!(YearRevenue::default().collection_days(45.0), 45.0);
        assert_eq!(YearRevenue::direct_only(1_000.0, 75.0).collection_days(30.0), 75.0);
    }
}
