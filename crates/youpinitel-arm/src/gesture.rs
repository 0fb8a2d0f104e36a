//! 动作序列（Gesture）与回放
//!
//! 动作序列由若干步组成，每步为 `(姿态或空, 持续时间)`。
//! 空姿态表示原地保持。回放严格顺序执行，第 n+1 步不会在第 n 步的持续时间结束前开始。

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::ArmError;
use crate::joint::JointName;
use crate::pose::Pose;

/// 单步动作
#[derive(Debug, Clone, PartialEq)]
pub struct GestureStep {
    /// 目标姿态，`None` 为保持
    pub pose: Option<Pose>,
    /// 本步持续时间
    pub duration: Duration,
}

/// 动作序列
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gesture {
    steps: Vec<GestureStep>,
}

impl Gesture {
    /// 由 `(姿态, 秒数)` 列表构造
    pub fn new<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = (Option<Pose>, f64)>,
    {
        Self {
            steps: steps
                .into_iter()
                .map(|(pose, secs)| GestureStep {
                    pose,
                    duration: Duration::try_from_secs_f64(secs.max(0.0))
                        .unwrap_or(Duration::MAX),
                })
                .collect(),
        }
    }

    /// 单步动作：在 `secs` 秒内到达 `pose`
    pub fn single(pose: Pose, secs: f64) -> Self {
        Self::new([(Some(pose), secs)])
    }

    pub fn steps(&self) -> &[GestureStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 总时长（饱和相加）
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |total, s| total.saturating_add(s.duration))
    }

    /// 传输无关的 JSON 形式
    ///
    /// `[[{"shoulder":170.0,...}, 1.0], [null, 0.5], ...]`
    pub fn to_json(&self) -> Result<String, ArmError> {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                let pose = match &step.pose {
                    Some(pose) => serde_json::to_value(pose)?,
                    None => Value::Null,
                };
                Ok(Value::Array(vec![pose, Value::from(step.duration.as_secs_f64())]))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(serde_json::to_string(&Value::Array(steps))?)
    }

    /// 从 JSON 形式解析
    ///
    /// 无法表示的持续时间（溢出、非数值）返回 [`ArmError::InvalidDuration`]。
    pub fn from_json(json: &str) -> Result<Self, ArmError> {
        let raw: Vec<(Option<Pose>, f64)> = serde_json::from_str(json)?;
        let steps = raw
            .into_iter()
            .map(|(pose, secs)| {
                let duration = step_duration(secs).ok_or(ArmError::InvalidDuration(secs))?;
                Ok(GestureStep { pose, duration })
            })
            .collect::<Result<Vec<_>, ArmError>>()?;
        Ok(Self { steps })
    }
}

/// 秒数 → 持续时间，负数截断为 0；溢出或 NaN 返回 `None`
fn step_duration(secs: f64) -> Option<Duration> {
    if secs.is_nan() {
        return None;
    }
    Duration::try_from_secs_f64(secs.max(0.0)).ok()
}

/// 计时源
///
/// 回放只通过它等待，测试可以替换为记录型实现。
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        spin_sleep::sleep(duration);
    }
}

/// 回放动作序列
///
/// 每步先向姿态中的所有关节下发目标角度，再等待该步持续时间。
pub fn play<C, F>(gesture: &Gesture, clock: &mut C, mut command: F) -> Result<(), ArmError>
where
    C: Clock + ?Sized,
    F: FnMut(JointName, f64) -> Result<(), ArmError>,
{
    for (index, step) in gesture.steps().iter().enumerate() {
        match &step.pose {
            Some(pose) => {
                debug!("gesture step {}: {} for {:?}", index, pose, step.duration);
                for (joint, angle) in pose.iter() {
                    command(joint, angle)?;
                }
            },
            None => debug!("gesture step {}: hold for {:?}", index, step.duration),
        }
        clock.sleep(step.duration);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Event {
        Move(JointName, f64),
        Sleep(Duration),
    }

    struct RecordingClock<'a>(&'a std::cell::RefCell<Vec<Event>>);

    impl Clock for RecordingClock<'_> {
        fn sleep(&mut self, duration: Duration) {
            self.0.borrow_mut().push(Event::Sleep(duration));
        }
    }

    fn pose_a() -> Pose {
        Pose::from([(JointName::Shoulder, 170.0), (JointName::Elbow, 60.0)])
    }

    fn pose_b() -> Pose {
        Pose::from([(JointName::Base, 200.0)])
    }

    #[test]
    fn test_play_three_steps_with_hold() {
        let gesture = Gesture::new([(Some(pose_a()), 1.0), (None, 0.5), (Some(pose_b()), 2.0)]);
        let events = std::cell::RefCell::new(Vec::new());
        let mut clock = RecordingClock(&events);

        play(&gesture, &mut clock, |joint, angle| {
            events.borrow_mut().push(Event::Move(joint, angle));
            Ok(())
        })
        .unwrap();

        assert_eq!(
            events.into_inner(),
            vec![
                Event::Move(JointName::Shoulder, 170.0),
                Event::Move(JointName::Elbow, 60.0),
                Event::Sleep(Duration::from_secs(1)),
                // 保持步：只有等待
                Event::Sleep(Duration::from_millis(500)),
                Event::Move(JointName::Base, 200.0),
                Event::Sleep(Duration::from_secs(2)),
            ]
        );
    }

    #[test]
    fn test_play_stops_on_command_error() {
        let gesture = Gesture::new([(Some(pose_b()), 1.0), (Some(pose_a()), 1.0)]);
        let events = std::cell::RefCell::new(Vec::new());
        let mut clock = RecordingClock(&events);

        let result = play(&gesture, &mut clock, |joint, _| {
            Err(ArmError::JointUnavailable(joint))
        });

        assert!(matches!(result, Err(ArmError::JointUnavailable(JointName::Base))));
        assert!(events.into_inner().is_empty());
    }

    #[test]
    fn test_json_form() {
        let gesture = Gesture::new([(Some(pose_b()), 1.0), (None, 0.5)]);
        assert_eq!(gesture.to_json().unwrap(), r#"[[{"base":200.0},1.0],[null,0.5]]"#);
    }

    #[test]
    fn test_from_json() {
        let gesture = Gesture::from_json(r#"[[{"base":200},1],[null,0.25]]"#).unwrap();
        assert_eq!(gesture.len(), 2);
        assert_eq!(gesture.steps()[0].pose, Some(pose_b()));
        assert_eq!(gesture.steps()[1].pose, None);
        assert_eq!(gesture.total_duration(), Duration::from_millis(1250));
    }

    #[test]
    fn test_negative_duration_is_clamped() {
        let gesture = Gesture::new([(None, -3.0)]);
        assert_eq!(gesture.steps()[0].duration, Duration::ZERO);
    }

    #[test]
    fn test_from_json_rejects_unrepresentable_duration() {
        assert!(matches!(
            Gesture::from_json(r#"[[null, 1e300]]"#),
            Err(ArmError::InvalidDuration(_))
        ));
        assert!(matches!(
            Gesture::from_json(r#"[[null, 1.0], [null, 1e300]]"#),
            Err(ArmError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_huge_duration_saturates() {
        let gesture = Gesture::new([(None, 1e300), (None, 1.0)]);
        assert_eq!(gesture.steps()[0].duration, Duration::MAX);
        assert_eq!(gesture.total_duration(), Duration::MAX);
    }
}
