//! Message catalogs for the four kiosk locales.
//!
//! Every user-facing string goes through [`t`]. Lookups fall back to English
//! and finally to the key itself, so a missing entry shows up on screen rather
//! than panicking.

use kiosk_core::message::MessageKey;
use serde::Deserialize;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
  En,
  #[default]
  De,
  Ru,
  Sk,
}

impl Locale {
  pub fn code(self) -> &'static str { self.into() }

  /// The locale after this one, wrapping around.
  pub fn next(self) -> Self {
    let all: Vec<_> = Locale::iter().collect();
    let i = all.iter().position(|l| *l == self).unwrap_or(0);
    all[(i + 1) % all.len()]
  }

  fn catalog(self) -> &'static [(&'static str, &'static str)] {
    match self {
      Locale::En => EN,
      Locale::De => DE,
      Locale::Ru => RU,
      Locale::Sk => SK,
    }
  }
}

/// Translate `key` into `locale`.
pub fn t<'a>(locale: Locale, key: &'a str) -> &'a str {
  lookup(locale.catalog(), key)
    .or_else(|| lookup(EN, key))
    .unwrap_or(key)
}

/// Translate a validation or status message.
pub fn message(locale: Locale, key: MessageKey) -> &'static str {
  t(locale, key.as_str())
}

fn lookup(catalog: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
  catalog.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

// ─── Catalogs ────────────────────────────────────────────────────────────────

const EN: &[(&str, &str)] = &[
  ("errors.required", "This field is required"),
  ("errors.invalidEmail", "Please enter a valid email address"),
  ("errors.invalidDate", "Please enter a valid date"),
  ("errors.invalidPhone", "Please enter a valid phone number"),
  ("errors.tooLong", "This entry is too long"),
  ("errors.checkboxRequired", "Please accept the terms"),
  ("errors.signatureRequired", "Please sign the form"),
  ("errors.incompleteChildData", "Please complete every child's details"),
  ("errors.tooManyChildren", "At most 5 children can be added"),
  ("errors.invalidPostalCode", "Please enter a valid postal code"),
  ("errors.branchNotFound", "This kiosk's branch is unknown"),
  ("errors.serverError", "Something went wrong. Please try again"),
  ("errors.networkError", "No connection to the server. Please try again"),
  ("form.title", "Join our newsletter"),
  ("form.firstName", "First name"),
  ("form.lastName", "Last name"),
  ("form.email", "Email"),
  ("form.dob", "Date of birth (YYYY-MM-DD)"),
  ("form.phone", "Phone"),
  ("form.address", "Address"),
  ("form.addAddress", "Add address"),
  ("form.removeAddress", "Remove address"),
  ("form.addressSearch", "Search address"),
  ("form.addressNotFound", "No matching address found"),
  ("form.street", "Street"),
  ("form.postalCode", "Postal code"),
  ("form.city", "City"),
  ("form.province", "Province"),
  ("form.country", "Country"),
  ("form.children", "Children"),
  ("form.addChild", "Add child"),
  ("form.removeChild", "Remove"),
  ("form.child", "Child"),
  ("form.gender", "Gender"),
  ("gender.male", "Boy"),
  ("gender.female", "Girl"),
  ("gender.other", "Other"),
  ("form.agree", "I agree to receive the newsletter"),
  ("form.signature", "Signature"),
  ("form.signatureHint", "Draw with the mouse or touch screen"),
  ("form.clearSignature", "Clear"),
  ("form.submit", "Subscribe"),
  ("modal.subscribing", "Subscribing"),
  ("modal.processing", "Processing your subscription"),
  ("modal.pleaseWait", "Please wait…"),
  ("modal.success", "Thank you!"),
  ("modal.successMessage", "You are now subscribed."),
  ("modal.error", "Subscription failed"),
  ("modal.close", "Close"),
  ("idle.title", "Are you still there?"),
  ("idle.message", "The form will be cleared in"),
  ("idle.seconds", "seconds"),
  ("idle.continue", "Continue"),
  ("branch.title", "Select branch"),
  ("branch.prompt", "This kiosk is not yet assigned to a branch."),
  ("branch.filter", "Filter"),
  ("branch.confirm", "Confirm"),
  ("branch.none", "No branches available"),
  ("hint.navigate", "Tab/↑↓ move"),
  ("hint.toggle", "Space toggle"),
  ("hint.submit", "Ctrl-S submit"),
  ("hint.locale", "F2 language"),
  ("hint.quit", "Ctrl-C quit"),
];

const DE: &[(&str, &str)] = &[
  ("errors.required", "Dieses Feld ist erforderlich"),
  ("errors.invalidEmail", "Bitte eine gültige E-Mail-Adresse eingeben"),
  ("errors.invalidDate", "Bitte ein gültiges Datum eingeben"),
  ("errors.invalidPhone", "Bitte eine gültige Telefonnummer eingeben"),
  ("errors.tooLong", "Die Eingabe ist zu lang"),
  ("errors.checkboxRequired", "Bitte stimmen Sie den Bedingungen zu"),
  ("errors.signatureRequired", "Bitte unterschreiben Sie das Formular"),
  ("errors.incompleteChildData", "Bitte die Angaben aller Kinder vervollständigen"),
  ("errors.tooManyChildren", "Es können höchstens 5 Kinder hinzugefügt werden"),
  ("errors.invalidPostalCode", "Bitte eine gültige Postleitzahl eingeben"),
  ("errors.branchNotFound", "Die Filiale dieses Kiosks ist unbekannt"),
  ("errors.serverError", "Etwas ist schiefgelaufen. Bitte erneut versuchen"),
  ("errors.networkError", "Keine Verbindung zum Server. Bitte erneut versuchen"),
  ("form.title", "Newsletter abonnieren"),
  ("form.firstName", "Vorname"),
  ("form.lastName", "Nachname"),
  ("form.email", "E-Mail"),
  ("form.dob", "Geburtsdatum (JJJJ-MM-TT)"),
  ("form.phone", "Telefon"),
  ("form.address", "Adresse"),
  ("form.addAddress", "Adresse hinzufügen"),
  ("form.removeAddress", "Adresse entfernen"),
  ("form.addressSearch", "Adresse suchen"),
  ("form.addressNotFound", "Keine passende Adresse gefunden"),
  ("form.street", "Straße"),
  ("form.postalCode", "Postleitzahl"),
  ("form.city", "Ort"),
  ("form.province", "Bundesland"),
  ("form.country", "Land"),
  ("form.children", "Kinder"),
  ("form.addChild", "Kind hinzufügen"),
  ("form.removeChild", "Entfernen"),
  ("form.child", "Kind"),
  ("form.gender", "Geschlecht"),
  ("gender.male", "Junge"),
  ("gender.female", "Mädchen"),
  ("gender.other", "Divers"),
  ("form.agree", "Ich möchte den Newsletter erhalten"),
  ("form.signature", "Unterschrift"),
  ("form.signatureHint", "Mit Maus oder Touchscreen zeichnen"),
  ("form.clearSignature", "Löschen"),
  ("form.submit", "Abonnieren"),
  ("modal.subscribing", "Anmeldung"),
  ("modal.processing", "Ihre Anmeldung wird verarbeitet"),
  ("modal.pleaseWait", "Bitte warten…"),
  ("modal.success", "Vielen Dank!"),
  ("modal.successMessage", "Sie sind jetzt angemeldet."),
  ("modal.error", "Anmeldung fehlgeschlagen"),
  ("modal.close", "Schließen"),
  ("idle.title", "Sind Sie noch da?"),
  ("idle.message", "Das Formular wird geleert in"),
  ("idle.seconds", "Sekunden"),
  ("idle.continue", "Weiter"),
  ("branch.title", "Filiale wählen"),
  ("branch.prompt", "Dieser Kiosk ist noch keiner Filiale zugeordnet."),
  ("branch.filter", "Filter"),
  ("branch.confirm", "Bestätigen"),
  ("branch.none", "Keine Filialen verfügbar"),
  ("hint.navigate", "Tab/↑↓ wechseln"),
  ("hint.toggle", "Leertaste umschalten"),
  ("hint.submit", "Strg-S absenden"),
  ("hint.locale", "F2 Sprache"),
  ("hint.quit", "Strg-C beenden"),
];

const RU: &[(&str, &str)] = &[
  ("errors.required", "Это поле обязательно"),
  ("errors.invalidEmail", "Введите корректный адрес электронной почты"),
  ("errors.invalidDate", "Введите корректную дату"),
  ("errors.invalidPhone", "Введите корректный номер телефона"),
  ("errors.tooLong", "Слишком длинное значение"),
  ("errors.checkboxRequired", "Пожалуйста, примите условия"),
  ("errors.signatureRequired", "Пожалуйста, поставьте подпись"),
  ("errors.incompleteChildData", "Заполните данные всех детей"),
  ("errors.tooManyChildren", "Можно добавить не более 5 детей"),
  ("errors.invalidPostalCode", "Введите корректный почтовый индекс"),
  ("errors.branchNotFound", "Филиал этого киоска неизвестен"),
  ("errors.serverError", "Что-то пошло не так. Попробуйте ещё раз"),
  ("errors.networkError", "Нет связи с сервером. Попробуйте ещё раз"),
  ("form.title", "Подписка на рассылку"),
  ("form.firstName", "Имя"),
  ("form.lastName", "Фамилия"),
  ("form.email", "Эл. почта"),
  ("form.dob", "Дата рождения (ГГГГ-ММ-ДД)"),
  ("form.phone", "Телефон"),
  ("form.address", "Адрес"),
  ("form.addAddress", "Добавить адрес"),
  ("form.removeAddress", "Удалить адрес"),
  ("form.addressSearch", "Поиск адреса"),
  ("form.addressNotFound", "Адрес не найден"),
  ("form.street", "Улица"),
  ("form.postalCode", "Индекс"),
  ("form.city", "Город"),
  ("form.province", "Регион"),
  ("form.country", "Страна"),
  ("form.children", "Дети"),
  ("form.addChild", "Добавить ребёнка"),
  ("form.removeChild", "Удалить"),
  ("form.child", "Ребёнок"),
  ("form.gender", "Пол"),
  ("gender.male", "Мальчик"),
  ("gender.female", "Девочка"),
  ("gender.other", "Другое"),
  ("form.agree", "Я согласен получать рассылку"),
  ("form.signature", "Подпись"),
  ("form.signatureHint", "Рисуйте мышью или пальцем"),
  ("form.clearSignature", "Очистить"),
  ("form.submit", "Подписаться"),
  ("modal.subscribing", "Подписка"),
  ("modal.processing", "Обрабатываем вашу подписку"),
  ("modal.pleaseWait", "Пожалуйста, подождите…"),
  ("modal.success", "Спасибо!"),
  ("modal.successMessage", "Вы подписаны."),
  ("modal.error", "Не удалось оформить подписку"),
  ("modal.close", "Закрыть"),
  ("idle.title", "Вы ещё здесь?"),
  ("idle.message", "Форма будет очищена через"),
  ("idle.seconds", "секунд"),
  ("idle.continue", "Продолжить"),
  ("branch.title", "Выбор филиала"),
  ("branch.prompt", "Этот киоск ещё не привязан к филиалу."),
  ("branch.filter", "Фильтр"),
  ("branch.confirm", "Подтвердить"),
  ("branch.none", "Нет доступных филиалов"),
  ("hint.navigate", "Tab/↑↓ переход"),
  ("hint.toggle", "Пробел переключить"),
  ("hint.submit", "Ctrl-S отправить"),
  ("hint.locale", "F2 язык"),
  ("hint.quit", "Ctrl-C выход"),
];

const SK: &[(&str, &str)] = &[
  ("errors.required", "Toto pole je povinné"),
  ("errors.invalidEmail", "Zadajte platnú e-mailovú adresu"),
  ("errors.invalidDate", "Zadajte platný dátum"),
  ("errors.invalidPhone", "Zadajte platné telefónne číslo"),
  ("errors.tooLong", "Zadaná hodnota je príliš dlhá"),
  ("errors.checkboxRequired", "Prosím, súhlaste s podmienkami"),
  ("errors.signatureRequired", "Prosím, podpíšte formulár"),
  ("errors.incompleteChildData", "Doplňte údaje všetkých detí"),
  ("errors.tooManyChildren", "Pridať možno najviac 5 detí"),
  ("errors.invalidPostalCode", "Zadajte platné PSČ"),
  ("errors.branchNotFound", "Pobočka tohto kiosku je neznáma"),
  ("errors.serverError", "Niečo sa pokazilo. Skúste to znova"),
  ("errors.networkError", "Žiadne spojenie so serverom. Skúste to znova"),
  ("form.title", "Prihlásenie na odber noviniek"),
  ("form.firstName", "Meno"),
  ("form.lastName", "Priezvisko"),
  ("form.email", "E-mail"),
  ("form.dob", "Dátum narodenia (RRRR-MM-DD)"),
  ("form.phone", "Telefón"),
  ("form.address", "Adresa"),
  ("form.addAddress", "Pridať adresu"),
  ("form.removeAddress", "Odstrániť adresu"),
  ("form.addressSearch", "Hľadať adresu"),
  ("form.addressNotFound", "Adresa sa nenašla"),
  ("form.street", "Ulica"),
  ("form.postalCode", "PSČ"),
  ("form.city", "Mesto"),
  ("form.province", "Kraj"),
  ("form.country", "Krajina"),
  ("form.children", "Deti"),
  ("form.addChild", "Pridať dieťa"),
  ("form.removeChild", "Odstrániť"),
  ("form.child", "Dieťa"),
  ("form.gender", "Pohlavie"),
  ("gender.male", "Chlapec"),
  ("gender.female", "Dievča"),
  ("gender.other", "Iné"),
  ("form.agree", "Súhlasím so zasielaním noviniek"),
  ("form.signature", "Podpis"),
  ("form.signatureHint", "Kreslite myšou alebo prstom"),
  ("form.clearSignature", "Vymazať"),
  ("form.submit", "Prihlásiť sa"),
  ("modal.subscribing", "Prihlasovanie"),
  ("modal.processing", "Spracúvame vaše prihlásenie"),
  ("modal.pleaseWait", "Prosím, čakajte…"),
  ("modal.success", "Ďakujeme!"),
  ("modal.successMessage", "Ste prihlásený na odber."),
  ("modal.error", "Prihlásenie zlyhalo"),
  ("modal.close", "Zavrieť"),
  ("idle.title", "Ste tu ešte?"),
  ("idle.message", "Formulár sa vymaže o"),
  ("idle.seconds", "sekúnd"),
  ("idle.continue", "Pokračovať"),
  ("branch.title", "Výber pobočky"),
  ("branch.prompt", "Tento kiosk ešte nie je priradený k pobočke."),
  ("branch.filter", "Filter"),
  ("branch.confirm", "Potvrdiť"),
  ("branch.none", "Žiadne dostupné pobočky"),
  ("hint.navigate", "Tab/↑↓ presun"),
  ("hint.toggle", "Medzerník prepnúť"),
  ("hint.submit", "Ctrl-S odoslať"),
  ("hint.locale", "F2 jazyk"),
  ("hint.quit", "Ctrl-C koniec"),
];
