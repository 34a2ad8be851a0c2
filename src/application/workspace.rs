use crate::application::debounce::{DebounceHandle, Debouncer};
use crate::application::dto::{PaymentConfig, PaymentRequest, WorkspaceSummary, WorkspaceView};
use crate::application::payment_orchestrator::{PaymentOrchestrator, SubmitOutcome};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::format::{format_currency_vnd, format_weight_kg};
use crate::domain::{
    selected_shipment_codes, LineItem, LineItemId, Money, PaymentResult, SelectionAggregate,
    SelectionSet,
};
use crate::ports::{ListQuery, NotificationPort, OrderPaymentPort};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct WorkspaceState {
    ship_code: String,
    items: Vec<LineItem>,
    selection: SelectionSet,
    /// 每次切换客户加一，用来丢弃过期的拉取结果
    generation: u64,
    /// 已发出的刷新序号
    refresh_issued: u64,
    /// 已写入列表的最新刷新序号，更早发出的结果直接丢弃
    refresh_applied: u64,
}

impl WorkspaceState {
    fn selectable_ids(&self) -> Vec<LineItemId> {
        self.items
            .iter()
            .filter(|item| item.is_selectable())
            .map(|item| item.id.clone())
            .collect()
    }
}

/// 一个客户的分批付款工作区：持有列表和选择状态，并驱动付款编排器
pub struct PaymentWorkspace<A: OrderPaymentPort + 'static, N: NotificationPort + 'static> {
    api: Arc<A>,
    notifier: Arc<N>,
    orchestrator: PaymentOrchestrator<A, N>,
    state: RwLock<WorkspaceState>,
    page_size: u32,
    search: Debouncer,
}

impl<A: OrderPaymentPort + 'static, N: NotificationPort + 'static> PaymentWorkspace<A, N> {
    pub fn new(
        api: Arc<A>,
        notifier: Arc<N>,
        ship_code: impl Into<String>,
        page_size: u32,
        search_delay: Duration,
    ) -> Arc<Self> {
        let ship_code = ship_code.into();
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let orchestrator = PaymentOrchestrator::new(api.clone(), notifier.clone())
                .with_refresh_hook(Arc::new(move || {
                    if let Some(workspace) = weak.upgrade() {
                        tokio::spawn(async move {
                            // 失败已经通过提示告知用户
                            let _ = workspace.refresh().await;
                        });
                    }
                }));

            Self {
                api,
                notifier,
                orchestrator,
                state: RwLock::new(WorkspaceState {
                    ship_code,
                    ..WorkspaceState::default()
                }),
                page_size,
                search: Debouncer::new(search_delay),
            }
        })
    }

    pub fn orchestrator(&self) -> &PaymentOrchestrator<A, N> {
        &self.orchestrator
    }

    pub async fn ship_code(&self) -> String {
        self.state.read().await.ship_code.clone()
    }

    pub async fn view(&self) -> WorkspaceView {
        let state = self.state.read().await;
        WorkspaceView {
            ship_code: state.ship_code.clone(),
            items: state.items.clone(),
            selection: state.selection.clone(),
        }
    }

    pub async fn selection(&self) -> SelectionSet {
        self.state.read().await.selection.clone()
    }

    /// 重新拉取当前客户的列表
    pub async fn refresh(&self) -> DomainResult<()> {
        let (ship_code, generation, ticket) = {
            let mut state = self.state.write().await;
            state.refresh_issued += 1;
            (state.ship_code.clone(), state.generation, state.refresh_issued)
        };

        let query = ListQuery::new(ship_code.clone(), 0, self.page_size);
        let page = match self.api.list_ship_code_payments(&query).await {
            Ok(page) => page,
            Err(e) => {
                warn!("Failed to load payments for {}: {}", ship_code, e);
                self.notifier.error(&e.user_message(), None);
                return Err(e);
            }
        };

        let items: Vec<LineItem> = page
            .content
            .into_iter()
            .flat_map(|group| group.items)
            .collect();

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!("Discarding list for {} fetched before customer change", ship_code);
            return Ok(());
        }
        if ticket < state.refresh_applied {
            debug!("Discarding list for {} superseded by a newer refresh", ship_code);
            return Ok(());
        }
        state.refresh_applied = ticket;
        Self::apply_items(&mut state, items);
        info!(
            "Loaded {} line items for {}, {} still selected",
            state.items.len(),
            ship_code,
            state.selection.len()
        );
        Ok(())
    }

    /// 用新列表替换旧列表，选择取交集
    pub async fn apply_list(&self, items: Vec<LineItem>) {
        let mut state = self.state.write().await;
        Self::apply_items(&mut state, items);
    }

    fn apply_items(state: &mut WorkspaceState, items: Vec<LineItem>) {
        state.items = items;
        let selectable = state.selectable_ids();
        state.selection = state.selection.retain_present(&selectable);
    }

    /// 切换客户：取消未执行的搜索，清空列表和选择后重新拉取
    pub async fn switch_customer(&self, ship_code: impl Into<String>) -> DomainResult<()> {
        self.search.cancel();
        self.load_customer(ship_code.into()).await
    }

    async fn load_customer(&self, ship_code: String) -> DomainResult<()> {
        {
            let mut state = self.state.write().await;
            state.ship_code = ship_code.trim().to_string();
            state.generation += 1;
            state.items.clear();
            state.selection = state.selection.clear();
        }
        self.refresh().await
    }

    /// 防抖后按新的运输码重新查询
    pub fn schedule_search(self: &Arc<Self>, ship_code: impl Into<String>) -> DebounceHandle {
        let weak = Arc::downgrade(self);
        let ship_code = ship_code.into();
        self.search.call(async move {
            if let Some(workspace) = weak.upgrade() {
                let _ = workspace.load_customer(ship_code).await;
            }
        })
    }

    pub async fn toggle(&self, id: &LineItemId) -> DomainResult<SelectionSet> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .iter()
            .find(|item| &item.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("line item {}", id)))?;

        if !item.is_selectable() {
            return Err(DomainError::validation(
                "selection",
                format!("Line item {} is {} and cannot be selected", id, item.status),
            ));
        }

        state.selection = state.selection.toggle(id);
        Ok(state.selection.clone())
    }

    pub async fn select_all(&self) -> SelectionSet {
        let mut state = self.state.write().await;
        let selectable = state.selectable_ids();
        state.selection = state.selection.select_all(&selectable);
        state.selection.clone()
    }

    pub async fn clear_selection(&self) -> SelectionSet {
        let mut state = self.state.write().await;
        state.selection = state.selection.clear();
        state.selection.clone()
    }

    pub async fn is_all_selected(&self) -> bool {
        let state = self.state.read().await;
        state.selection.is_all_selected(&state.selectable_ids())
    }

    pub async fn summary(
        &self,
        domestic_shipping_price: Option<Money>,
    ) -> DomainResult<WorkspaceSummary> {
        let state = self.state.read().await;
        let aggregate = SelectionAggregate::compute(&state.items, &state.selection)?;
        let final_payable = domestic_shipping_price
            .map(|price| aggregate.final_payable(price))
            .transpose()?;

        Ok(WorkspaceSummary {
            ship_code: state.ship_code.clone(),
            item_count: state.items.len(),
            all_selected: state.selection.is_all_selected(&state.selectable_ids()),
            shipment_codes: selected_shipment_codes(&state.items, &state.selection),
            selected_total_display: format_currency_vnd(Some(aggregate.selected_total.amount())),
            selected_weight_display: format_weight_kg(&aggregate.selected_weight),
            final_payable_display: final_payable.map(|m| format_currency_vnd(Some(m.amount()))),
            final_payable,
            aggregate,
        })
    }

    /// 分批付款：以当前选择的快照提交，成功后清空选择
    pub async fn submit_divided(&self, config: PaymentConfig) -> SubmitOutcome {
        let request = {
            let state = self.state.read().await;
            let codes = selected_shipment_codes(&state.items, &state.selection);
            PaymentRequest::divided(codes, config)
        };

        let outcome = self.orchestrator.submit(request).await;
        if outcome.is_success() {
            self.clear_selection().await;
        }
        outcome
    }

    /// 当前客户运输码整单付款
    pub async fn submit_ship_code(&self, config: PaymentConfig) -> SubmitOutcome {
        let ship_code = self.ship_code().await;
        let outcome = self
            .orchestrator
            .submit(PaymentRequest::by_ship_code(ship_code, config))
            .await;
        if outcome.is_success() {
            self.clear_selection().await;
        }
        outcome
    }

    pub fn dismiss_result(&self) -> Option<PaymentResult> {
        self.orchestrator.dismiss()
    }

    pub fn teardown(&self) {
        self.search.cancel();
        self.orchestrator.teardown();
    }
}
