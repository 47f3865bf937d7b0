use super::{NotificationData, NotificationType};

const BRAND: &str = "Aulux - Semillero Digital";

pub fn subject(kind: NotificationType, data: &NotificationData) -> String {
    let prefix = match kind {
        NotificationType::NewTask => "📚 Nueva tarea",
        NotificationType::DueSoon => "⏰ Tarea vence pronto",
        NotificationType::Overdue => "🚨 Tarea vencida",
        NotificationType::SubmissionReceived => "✅ Nueva entrega",
        NotificationType::TaskReturned => "📝 Tarea devuelta",
    };
    format!("{}: {}", prefix, data.task_title)
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn field(label: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "<p><strong>{}:</strong> {}</p>",
            label,
            escape(value)
        ),
        None => String::new(),
    }
}

pub fn email_html(kind: NotificationType, data: &NotificationData) -> String {
    let task = field("Tarea", Some(&data.task_title));
    let course = field("Curso", Some(&data.course_name));
    let due = data.due_date.as_deref();

    let body = match kind {
        NotificationType::NewTask => format!(
            r#"<h2 style="color: #1f2937;">📚 Nueva tarea asignada</h2>{task}{course}{}<p>Revisa los detalles en Google Classroom o en tu dashboard de Aulux.</p>"#,
            field("Fecha límite", due)
        ),
        NotificationType::DueSoon => format!(
            r#"<h2 style="color: #f59e0b;">⏰ Tarea vence pronto</h2>{task}{course}{}<p style="color: #f59e0b;"><strong>¡No olvides entregar a tiempo!</strong></p>"#,
            field("Vence", due)
        ),
        NotificationType::Overdue => format!(
            r#"<h2 style="color: #ef4444;">🚨 Tarea vencida</h2>{task}{course}{}<p style="color: #ef4444;"><strong>Entrega lo antes posible para evitar penalizaciones.</strong></p>"#,
            field("Venció", due)
        ),
        NotificationType::SubmissionReceived => format!(
            r#"<h2 style="color: #10b981;">✅ Nueva entrega recibida</h2>{}{task}{course}{}<p>Revisa la entrega en Google Classroom.</p>"#,
            field("Estudiante", data.student_name.as_deref()),
            field("Entregado", data.submission_date.as_deref())
        ),
        NotificationType::TaskReturned => format!(
            r#"<h2 style="color: #8b5cf6;">📝 Tarea devuelta con comentarios</h2>{task}{course}{}<p>Tu profesor ha devuelto la tarea con comentarios. Revisa Google Classroom para ver los detalles.</p>"#,
            field("Profesor", data.teacher_name.as_deref())
        ),
    };

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: #3B82F6; color: white; padding: 20px; border-radius: 8px 8px 0 0;">
    <h1 style="margin: 0; font-size: 24px;">{BRAND}</h1>
  </div>
  <div style="background: #f9fafb; padding: 20px; border-radius: 0 0 8px 8px; border: 1px solid #e5e7eb;">
    {body}
  </div>
  <div style="text-align: center; margin-top: 20px; color: #6b7280; font-size: 12px;">
    <p>Este es un mensaje automático de Aulux. No responder a este email.</p>
  </div>
</div>"#
    )
}

pub fn whatsapp_text(kind: NotificationType, data: &NotificationData) -> String {
    let header = format!("🎓 *{}*\n\n", BRAND);
    let task = format!("📝 Tarea: {}\n", data.task_title);
    let course = format!("📖 Curso: {}\n", data.course_name);
    let line = |label: &str, value: Option<&str>| {
        value
            .map(|v| format!("{}: {}\n", label, v))
            .unwrap_or_default()
    };
    let due = data.due_date.as_deref();

    let body = match kind {
        NotificationType::NewTask => format!(
            "📚 *Nueva tarea asignada*\n\n{task}{course}{}\n¡Revisa los detalles en Classroom!",
            line("📅 Vence", due)
        ),
        NotificationType::DueSoon => format!(
            "⏰ *Tarea vence pronto*\n\n{task}{course}{}\n🚨 ¡No olvides entregar a tiempo!",
            line("📅 Vence", due)
        ),
        NotificationType::Overdue => format!(
            "🚨 *Tarea vencida*\n\n{task}{course}{}\n⚠️ Entrega lo antes posible",
            line("📅 Venció", due)
        ),
        NotificationType::SubmissionReceived => format!(
            "✅ *Nueva entrega recibida*\n\n{}{task}{course}{}\n📋 Revisa en Classroom",
            line("👤 Estudiante", data.student_name.as_deref()),
            line("📅 Entregado", data.submission_date.as_deref())
        ),
        NotificationType::TaskReturned => format!(
            "📝 *Tarea devuelta con comentarios*\n\n{task}{course}{}\n💬 Revisa los comentarios en Classroom",
            line("👨‍🏫 Profesor", data.teacher_name.as_deref())
        ),
    };

    header + &body
}
