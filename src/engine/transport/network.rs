// ==========================================
// 零售分析驾驶舱 - 最小费用流网络
// ==========================================
// 算法: 逐次最短增广路 (SSP) + SPFA (队列版 Bellman-Ford)
// 下界处理: 下界边 [l, u] 拆为容量 u-l 的残量边, 节点盈亏由超级源/汇补齐
// 数值: 全部容量与费用为 i64 定点整数, 不引入浮点误差
// 确定性: 邻接表按加边顺序遍历, 松弛使用严格小于, 等长路径取先发现者
// ==========================================

use std::collections::VecDeque;
use thiserror::Error;

/// 网络求解内部错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("增广次数超过上限: {iterations}")]
    IterationLimit { iterations: usize },

    #[error("残量网络存在负环")]
    NegativeCycle,

    #[error("边的上下界非法: lower={lower}, upper={upper}")]
    InvalidBounds { lower: i64, upper: i64 },
}

/// 原始边（带上下界）
#[derive(Debug, Clone, Copy)]
struct ArcSpec {
    from: usize,
    to: usize,
    lower: i64,
    upper: i64,
    cost: i64,
}

/// 残量边（正反向成对存放: e 与 e ^ 1 互为反向边）
#[derive(Debug, Clone, Copy)]
struct ResidualEdge {
    to: usize,
    cap: i64,
    cost: i64,
}

/// 边句柄
pub type ArcId = usize;

// ==========================================
// FlowNetwork - 带下界的费用流网络
// ==========================================
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    node_count: usize,
    arcs: Vec<ArcSpec>,
}

/// 求解结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSolution {
    /// 每条原始边的流量（与 add_arc 返回的 ArcId 对应）
    pub arc_flows: Vec<i64>,
    /// 增广次数
    pub augmentations: usize,
}

impl FlowNetwork {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            arcs: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// 添加边 from → to, 流量区间 [lower, upper], 单位费用 cost
    pub fn add_arc(
        &mut self,
        from: usize,
        to: usize,
        lower: i64,
        upper: i64,
        cost: i64,
    ) -> Result<ArcId, FlowError> {
        if lower < 0 || upper < lower {
            return Err(FlowError::InvalidBounds { lower, upper });
        }
        self.arcs.push(ArcSpec {
            from,
            to,
            lower,
            upper,
            cost,
        });
        Ok(self.arcs.len() - 1)
    }

    /// 最小费用可行环流
    ///
    /// 所有节点须满足流量守恒, 所有边须满足上下界。
    /// 调用方通过添加 汇 → 源 的回流边把 s-t 流问题转为环流问题。
    ///
    /// # 返回
    /// - Ok(Some(solution)): 存在可行环流, 且为费用最小者（要求原始费用非负, 无负环）
    /// - Ok(None): 下界无法同时满足（不可行）
    /// - Err: 增广次数超限 / 负环
    pub fn min_cost_circulation(
        &self,
        max_augmentations: usize,
    ) -> Result<Option<FlowSolution>, FlowError> {
        // 超级源 = node_count, 超级汇 = node_count + 1
        let super_source = self.node_count;
        let super_sink = self.node_count + 1;
        let mut residual = Residual::new(self.node_count + 2);

        let mut excess = vec![0i64; self.node_count];
        let mut arc_edges = Vec::with_capacity(self.arcs.len());
        for arc in &self.arcs {
            let edge = residual.add_edge(arc.from, arc.to, arc.upper - arc.lower, arc.cost);
            arc_edges.push(edge);
            excess[arc.to] += arc.lower;
            excess[arc.from] -= arc.lower;
        }

        let mut required = 0i64;
        for (node, value) in excess.iter().enumerate() {
            if *value > 0 {
                residual.add_edge(super_source, node, *value, 0);
                required += *value;
            } else if *value < 0 {
                residual.add_edge(node, super_sink, -*value, 0);
            }
        }

        let (pushed, augmentations) =
            residual.successive_shortest_paths(super_source, super_sink, required, max_augmentations)?;

        if pushed < required {
            return Ok(None);
        }

        let arc_flows = self
            .arcs
            .iter()
            .zip(&arc_edges)
            .map(|(arc, &edge)| arc.lower + residual.flow_on(edge, arc.upper - arc.lower))
            .collect();

        Ok(Some(FlowSolution {
            arc_flows,
            augmentations,
        }))
    }

    /// 最小费用最大流（要求所有边下界为 0）
    ///
    /// # 返回
    /// - (最大流量, 各边流量)
    pub fn min_cost_max_flow(
        &self,
        source: usize,
        sink: usize,
        max_augmentations: usize,
    ) -> Result<(i64, FlowSolution), FlowError> {
        let mut residual = Residual::new(self.node_count);
        let mut arc_edges = Vec::with_capacity(self.arcs.len());
        for arc in &self.arcs {
            if arc.lower != 0 {
                return Err(FlowError::InvalidBounds {
                    lower: arc.lower,
                    upper: arc.upper,
                });
            }
            arc_edges.push(residual.add_edge(arc.from, arc.to, arc.upper, arc.cost));
        }

        let (pushed, augmentations) =
            residual.successive_shortest_paths(source, sink, i64::MAX, max_augmentations)?;

        let arc_flows = self
            .arcs
            .iter()
            .zip(&arc_edges)
            .map(|(arc, &edge)| residual.flow_on(edge, arc.upper))
            .collect();

        Ok((
            pushed,
            FlowSolution {
                arc_flows,
                augmentations,
            },
        ))
    }
}

// ==========================================
// Residual - 残量网络
// ==========================================
struct Residual {
    adjacency: Vec<Vec<usize>>,
    edges: Vec<ResidualEdge>,
}

impl Residual {
    fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edges: Vec::new(),
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: i64, cost: i64) -> usize {
        let forward = self.edges.len();
        self.edges.push(ResidualEdge { to, cap, cost });
        self.edges.push(ResidualEdge {
            to: from,
            cap: 0,
            cost: -cost,
        });
        self.adjacency[from].push(forward);
        self.adjacency[to].push(forward + 1);
        forward
    }

    /// 正向边当前流量 = 初始容量 - 剩余容量
    fn flow_on(&self, edge: usize, initial_cap: i64) -> i64 {
        initial_cap - self.edges[edge].cap
    }

    /// 逐次最短增广路
    ///
    /// # 返回
    /// (实际推送流量, 增广次数)
    fn successive_shortest_paths(
        &mut self,
        source: usize,
        sink: usize,
        limit: i64,
        max_augmentations: usize,
    ) -> Result<(i64, usize), FlowError> {
        let mut pushed = 0i64;
        let mut augmentations = 0usize;

        while pushed < limit {
            let Some(prev_edge) = self.shortest_path(source, sink)? else {
                break;
            };

            if augmentations >= max_augmentations {
                return Err(FlowError::IterationLimit {
                    iterations: augmentations,
                });
            }

            // 路径瓶颈容量
            let mut bottleneck = limit - pushed;
            let mut node = sink;
            while node != source {
                let edge = prev_edge[node].ok_or(FlowError::NegativeCycle)?;
                bottleneck = bottleneck.min(self.edges[edge].cap);
                node = self.edges[edge ^ 1].to;
            }

            let mut node = sink;
            while node != source {
                let edge = prev_edge[node].ok_or(FlowError::NegativeCycle)?;
                self.edges[edge].cap -= bottleneck;
                self.edges[edge ^ 1].cap += bottleneck;
                node = self.edges[edge ^ 1].to;
            }

            pushed += bottleneck;
            augmentations += 1;
        }

        Ok((pushed, augmentations))
    }

    /// SPFA 最短路（允许负费用反向边）
    ///
    /// # 返回
    /// - Some(prev_edge): 到达 sink 的前驱边表
    /// - None: sink 不可达
    fn shortest_path(&self, source: usize, sink: usize) -> Result<Option<Vec<Option<usize>>>, FlowError> {
        let n = self.adjacency.len();
        let mut dist = vec![i64::MAX; n];
        let mut prev_edge: Vec<Option<usize>> = vec![None; n];
        let mut in_queue = vec![false; n];
        let mut enqueue_count = vec![0usize; n];
        let mut queue = VecDeque::new();

        dist[source] = 0;
        queue.push_back(source);
        in_queue[source] = true;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            for &e in &self.adjacency[u] {
                let edge = self.edges[e];
                if edge.cap <= 0 {
                    continue;
                }
                let candidate = dist[u] + edge.cost;
                if candidate < dist[edge.to] {
                    dist[edge.to] = candidate;
                    prev_edge[edge.to] = Some(e);
                    if !in_queue[edge.to] {
                        enqueue_count[edge.to] += 1;
                        // 入队次数超过节点数说明存在负环
                        if enqueue_count[edge.to] > n {
                            return Err(FlowError::NegativeCycle);
                        }
                        queue.push_back(edge.to);
                        in_queue[edge.to] = true;
                    }
                }
            }
        }

        if dist[sink] == i64::MAX {
            Ok(None)
        } else {
            Ok(Some(prev_edge))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circulation_respects_lower_bound() {
        // 0 -> 1 -> 2, 回流 2 -> 0; 中间边下界 5
        let mut network = FlowNetwork::new(3);
        let a = network.add_arc(0, 1, 0, 10, 1).unwrap();
        let b = network.add_arc(1, 2, 5, 10, 2).unwrap();
        let back = network.add_arc(2, 0, 0, 100, 0).unwrap();

        let solution = network.min_cost_circulation(100).unwrap().unwrap();
        assert_eq!(solution.arc_flows[a], 5);
        assert_eq!(solution.arc_flows[b], 5);
        assert_eq!(solution.arc_flows[back], 5);
    }

    #[test]
    fn test_circulation_infeasible_lower_bound() {
        // 下界 8 超过上游容量 5
        let mut network = FlowNetwork::new(3);
        network.add_arc(0, 1, 0, 5, 1).unwrap();
        network.add_arc(1, 2, 8, 10, 0).unwrap();
        network.add_arc(2, 0, 0, 100, 0).unwrap();

        assert_eq!(network.min_cost_circulation(100).unwrap(), None);
    }

    #[test]
    fn test_circulation_picks_cheaper_parallel_path() {
        // 两条平行路径, 便宜的一条容量 3
        let mut network = FlowNetwork::new(4);
        let cheap = network.add_arc(0, 1, 0, 3, 1).unwrap();
        let dear = network.add_arc(0, 2, 0, 10, 4).unwrap();
        network.add_arc(1, 3, 0, 10, 0).unwrap();
        network.add_arc(2, 3, 0, 10, 0).unwrap();
        network.add_arc(3, 0, 5, 5, 0).unwrap();

        let solution = network.min_cost_circulation(100).unwrap().unwrap();
        assert_eq!(solution.arc_flows[cheap], 3);
        assert_eq!(solution.arc_flows[dear], 2);
    }

    #[test]
    fn test_min_cost_max_flow() {
        let mut network = FlowNetwork::new(4);
        network.add_arc(0, 1, 0, 4, 0).unwrap();
        network.add_arc(0, 2, 0, 4, 0).unwrap();
        let a = network.add_arc(1, 3, 0, 3, 2).unwrap();
        let b = network.add_arc(2, 3, 0, 10, 1).unwrap();

        let (value, solution) = network.min_cost_max_flow(0, 3, 100).unwrap();
        assert_eq!(value, 7);
        assert_eq!(solution.arc_flows[a], 3);
        assert_eq!(solution.arc_flows[b], 4);
    }

    #[test]
    fn test_max_flow_rejects_lower_bounds() {
        let mut network = FlowNetwork::new(2);
        network.add_arc(0, 1, 1, 2, 0).unwrap();
        assert!(matches!(
            network.min_cost_max_flow(0, 1, 10),
            Err(FlowError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let mut network = FlowNetwork::new(2);
        assert!(network.add_arc(0, 1, 5, 3, 0).is_err());
        assert!(network.add_arc(0, 1, -1, 3, 0).is_err());
    }

    #[test]
    fn test_iteration_limit() {
        let mut network = FlowNetwork::new(4);
        network.add_arc(0, 1, 0, 1, 1).unwrap();
        network.add_arc(0, 2, 0, 1, 2).unwrap();
        network.add_arc(1, 3, 0, 1, 0).unwrap();
        network.add_arc(2, 3, 0, 1, 0).unwrap();

        // 需要两次增广, 上限 1
        assert_eq!(
            network.min_cost_max_flow(0, 3, 1),
            Err(FlowError::IterationLimit { iterations: 1 })
        );
    }

    #[test]
    fn test_negative_cycle_detected() {
        let mut network = FlowNetwork::new(3);
        network.add_arc(0, 1, 0, 5, -3).unwrap();
        network.add_arc(1, 0, 0, 5, 1).unwrap();
        network.add_arc(1, 2, 0, 5, 0).unwrap();

        assert_eq!(
            network.min_cost_max_flow(0, 2, 100),
            Err(FlowError::NegativeCycle)
        );
    }
}
